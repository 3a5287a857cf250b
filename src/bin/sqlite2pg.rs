//! sqlite2pg — SQLite dump to PostgreSQL converter
//!
//! # Usage
//!
//! ```bash
//! # Convert, writing family_export_postgres.sql next to the input
//! sqlite2pg family_export.sql
//!
//! # Explicit output
//! sqlite2pg family_export.sql -o family_postgres.sql
//!
//! # Show what would change
//! sqlite2pg family_export.sql --dry-run
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqlite2pg::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlite2pg")]
#[command(version)]
#[command(about = "Rewrite a SQLite dump into PostgreSQL SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlite2pg family_export.sql
    sqlite2pg family_export.sql -o family_postgres.sql
    sqlite2pg family_export.sql --dry-run --format json
    sqlite2pg rules")]
struct Cli {
    /// SQLite dump to convert
    input: Option<PathBuf>,

    /// Where to write the PostgreSQL script
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the converted SQL instead of writing a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Don't write anything, just report which rules fired
    #[arg(short, long)]
    dry_run: bool,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Config file (defaults to ./sqlite2pg.toml)
    #[arg(short, long, env = "SQLITE2PG_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the active rewrite rules in order
    Rules,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Rules) => show_rules(&cli),
        None => run(&cli),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sqlite2pg=debug" } else { "sqlite2pg=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rewriter(cli: &Cli) -> anyhow::Result<(Config, DialectRewriter)> {
    let config = Config::discover(cli.config.as_deref())?;
    let rules = config.rule_set().context("building rule set")?;
    Ok((config, DialectRewriter::new(rules)))
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let (config, rewriter) = load_rewriter(cli)?;

    let input = cli
        .input
        .clone()
        .or_else(|| config.input.clone())
        .ok_or(ConvertError::MissingInput)?;

    if cli.verbose {
        eprintln!("{} {}", "Input:".dimmed(), input.display().to_string().yellow());
    }

    if cli.dry_run || cli.stdout {
        let sql = read_script(&input)?;
        let conversion = rewriter.rewrite(&sql);
        if cli.stdout {
            print!("{}", conversion.sql);
        } else {
            print_summary(&conversion, &cli.format)?;
        }
        return Ok(());
    }

    let output = cli
        .output
        .clone()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| default_output(&input));

    let conversion = convert_file(&rewriter, &input, &output)?;
    if cli.verbose {
        print_summary(&conversion, &cli.format)?;
    }

    println!(
        "{} Converted {} to {}",
        "✓".green(),
        input.display(),
        output.display().to_string().cyan()
    );
    Ok(())
}

/// `dump.sql` -> `dump_postgres.sql`, in the same directory.
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dump".to_string());
    input.with_file_name(format!("{}_postgres.sql", stem))
}

fn print_summary(conversion: &Conversion, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(conversion)?);
        }
        OutputFormat::Table => {
            let width = conversion
                .rules
                .iter()
                .map(|r| r.rule.len())
                .max()
                .unwrap_or(4)
                .max(4);

            let header = format!("{:width$}  Hits", "Rule", width = width);
            println!("{}", header.white().bold());
            println!("{}", "─".repeat(width + 6).dimmed());
            for hit in &conversion.rules {
                let count = if hit.hits > 0 {
                    hit.hits.to_string().yellow()
                } else {
                    hit.hits.to_string().dimmed()
                };
                println!("{:width$}  {}", hit.rule, count, width = width);
            }
            println!();
            println!("{} rewrite(s)", conversion.total_hits().to_string().cyan());
        }
    }
    Ok(())
}

fn show_rules(cli: &Cli) -> anyhow::Result<()> {
    let (_, rewriter) = load_rewriter(cli)?;

    println!("{}", "sqlite2pg rewrite rules".cyan().bold());
    println!();
    println!(
        "{:4} {:24} {:50} {}",
        "#".white().bold(),
        "Name".white().bold(),
        "Pattern".white().bold(),
        "Replacement".white().bold()
    );
    println!("{}", "─".repeat(100).dimmed());

    for (i, rule) in rewriter.rules().iter().enumerate() {
        println!(
            "{:4} {:24} {:50} {}",
            (i + 1).to_string().dimmed(),
            rule.name().cyan(),
            rule.pattern().as_str().yellow(),
            rule.replacement().to_string().white()
        );
    }
    Ok(())
}
