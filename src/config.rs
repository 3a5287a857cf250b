//! Configuration file support.
//!
//! ```toml
//! input = "database/family_export.sql"
//! output = "database/family_postgres.sql"
//! disable = ["commit"]
//!
//! [[rules]]
//! name = "blob-type"
//! pattern = "\\bBLOB\\b"
//! replacement = "BYTEA"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConvertError, ConvertResult};
use crate::rules::{Replacement, Rule, RuleSet};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "sqlite2pg.toml";

/// Converter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default input dump.
    pub input: Option<PathBuf>,

    /// Default output script.
    pub output: Option<PathBuf>,

    /// Built-in rules to skip, by name.
    #[serde(default)]
    pub disable: Vec<String>,

    /// Extra rules, run after the built-in ones.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// A user-defined rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub name: String,
    pub pattern: String,
    /// Replacement template. Omit to leave matches unchanged.
    pub replacement: Option<String>,
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        let config = Self::from_toml(&content)
            .map_err(|e| ConvertError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> ConvertResult<Self> {
        toml::from_str(content).map_err(|e| ConvertError::Config(e.to_string()))
    }

    /// Find and load the config.
    ///
    /// An explicit path must exist. Otherwise `./sqlite2pg.toml` is tried,
    /// then `<config dir>/sqlite2pg/config.toml`, then the defaults.
    pub fn discover(explicit: Option<&Path>) -> ConvertResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }

        if let Some(dir) = dirs::config_dir() {
            let global = dir.join("sqlite2pg").join("config.toml");
            if global.exists() {
                return Self::load(global);
            }
        }

        Ok(Self::default())
    }

    /// Build the rule set: built-ins minus `disable`, then the extra rules.
    pub fn rule_set(&self) -> ConvertResult<RuleSet> {
        let mut rules = RuleSet::sqlite_to_postgres();
        for name in &self.disable {
            rules.disable(name)?;
        }
        for extra in &self.rules {
            let replacement = match &extra.replacement {
                Some(text) => Replacement::template(text.as_str()),
                None => Replacement::Identity,
            };
            rules.push(Rule::new(extra.name.as_str(), &extra.pattern, replacement)?);
        }
        Ok(rules)
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the default input path
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input = Some(path.into());
        self
    }

    /// Set the default output path
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    /// Skip a built-in rule
    pub fn disable(mut self, name: impl Into<String>) -> Self {
        self.config.disable.push(name.into());
        self
    }

    /// Add an extra rule
    pub fn rule(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: Option<&str>,
    ) -> Self {
        self.config.rules.push(RuleConfig {
            name: name.into(),
            pattern: pattern.into(),
            replacement: replacement.map(str::to_string),
        });
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}
