//! Dialect rewriter.
//!
//! Runs a [`RuleSet`] over a whole SQL buffer. Each rule is applied to every
//! occurrence in the current buffer, and its output is the next rule's input.
//! Nothing is parsed: statements the rules don't recognise pass through as is.

use std::path::Path;

use serde::Serialize;

use crate::error::{ConvertError, ConvertResult};
use crate::rules::RuleSet;

/// How many times a rule changed the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub rule: String,
    pub hits: usize,
}

/// The result of rewriting one script.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// The rewritten script.
    #[serde(skip)]
    pub sql: String,
    /// One entry per rule, in application order.
    pub rules: Vec<RuleHit>,
}

impl Conversion {
    /// Total number of hits across all rules.
    pub fn total_hits(&self) -> usize {
        self.rules.iter().map(|r| r.hits).sum()
    }

    /// Hits recorded for `rule`, if it ran.
    pub fn hits(&self, rule: &str) -> Option<usize> {
        self.rules.iter().find(|r| r.rule == rule).map(|r| r.hits)
    }
}

/// Applies an ordered rule set to SQL text.
#[derive(Debug, Clone)]
pub struct DialectRewriter {
    rules: RuleSet,
}

impl Default for DialectRewriter {
    fn default() -> Self {
        Self::sqlite_to_postgres()
    }
}

impl DialectRewriter {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Rewriter with the built-in SQLite to PostgreSQL rules.
    pub fn sqlite_to_postgres() -> Self {
        Self::new(RuleSet::sqlite_to_postgres())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Rewrite `sql`, one rule after another.
    ///
    /// # Example
    ///
    /// ```
    /// use sqlite2pg::DialectRewriter;
    ///
    /// let rewriter = DialectRewriter::sqlite_to_postgres();
    /// let out = rewriter.rewrite("BEGIN TRANSACTION;\nCREATE TABLE logs (at DATETIME);");
    /// assert_eq!(out.sql, "BEGIN;\nCREATE TABLE IF NOT EXISTS logs (at TIMESTAMP);");
    /// ```
    pub fn rewrite(&self, sql: &str) -> Conversion {
        let mut buffer = sql.to_string();
        let mut hits = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let (out, count) = rule.apply(&buffer);
            let out = out.into_owned();
            if count > 0 {
                tracing::debug!("rule '{}' rewrote {} occurrence(s)", rule.name(), count);
            }
            buffer = out;
            hits.push(RuleHit {
                rule: rule.name().to_string(),
                hits: count,
            });
        }

        Conversion { sql: buffer, rules: hits }
    }
}

/// Read `input`, rewrite it, and write the result to `output`.
///
/// The output file is created or truncated. Nothing is written if the input
/// cannot be read.
pub fn convert_file(
    rewriter: &DialectRewriter,
    input: &Path,
    output: &Path,
) -> ConvertResult<Conversion> {
    let sql = read_script(input)?;
    let conversion = rewriter.rewrite(&sql);
    std::fs::write(output, &conversion.sql).map_err(|e| ConvertError::io(output, e))?;
    tracing::info!(
        "wrote {} ({} bytes, {} rewrite(s))",
        output.display(),
        conversion.sql.len(),
        conversion.total_hits()
    );
    Ok(conversion)
}

/// Read a whole SQL script into memory.
pub fn read_script(path: &Path) -> ConvertResult<String> {
    let sql = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    tracing::debug!("read {} ({} bytes)", path.display(), sql.len());
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Replacement, Rule};

    fn rewrite(sql: &str) -> String {
        DialectRewriter::sqlite_to_postgres().rewrite(sql).sql
    }

    #[test]
    fn test_scenario_create_users() {
        let sql = "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY AUTOINCREMENT, \
                   created DATETIME DEFAULT CURRENT_TIMESTAMP, active BOOLEAN DEFAULT 1);";
        assert_eq!(
            rewrite(sql),
            "CREATE TABLE IF NOT EXISTS users (id SERIAL PRIMARY KEY, \
             created TIMESTAMP DEFAULT NOW(), active BOOLEAN DEFAULT TRUE);"
        );
    }

    #[test]
    fn test_scenario_transaction() {
        let sql = "PRAGMA foreign_keys=ON;\nBEGIN TRANSACTION;\nCREATE TABLE logs (id INTEGER);\nCOMMIT;";
        assert_eq!(
            rewrite(sql),
            "\nBEGIN;\nCREATE TABLE IF NOT EXISTS logs (id INTEGER);\nCOMMIT;"
        );
    }

    #[test]
    fn test_boolean_default_false() {
        let out = rewrite("CREATE TABLE t (done BOOLEAN DEFAULT 0);");
        assert!(out.contains("BOOLEAN DEFAULT FALSE"));
    }

    #[test]
    fn test_autoincrement_order() {
        // The bare keyword rule must not eat the token out of the primary key phrase.
        let out = rewrite("id INTEGER PRIMARY KEY AUTOINCREMENT, n INTEGER AUTOINCREMENT");
        assert_eq!(out, "id SERIAL PRIMARY KEY, n INTEGER ");
    }

    #[test]
    fn test_hits_recorded_per_rule() {
        let conversion = DialectRewriter::sqlite_to_postgres()
            .rewrite("PRAGMA a;PRAGMA b;\nCREATE TABLE t (at DATETIME);\nCOMMIT;");
        assert_eq!(conversion.rules.len(), 12);
        assert_eq!(conversion.hits("strip-pragma"), Some(2));
        assert_eq!(conversion.hits("datetime-type"), Some(1));
        assert_eq!(conversion.hits("create-table-guard"), Some(1));
        assert_eq!(conversion.hits("commit"), Some(0));
        assert_eq!(conversion.total_hits(), 4);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let sql = "PRAGMA foreign_keys=OFF;\nBEGIN TRANSACTION;\n\
                   CREATE TABLE a (id INTEGER PRIMARY KEY AUTOINCREMENT, ok BOOLEAN DEFAULT 0);\n\
                   CREATE TABLE IF NOT EXISTS b (at DATETIME DEFAULT CURRENT_TIMESTAMP);\n\
                   INSERT INTO a VALUES(1,0);\nCOMMIT;\n";
        let rewriter = DialectRewriter::sqlite_to_postgres();
        let once = rewriter.rewrite(sql);
        let twice = rewriter.rewrite(&once.sql);
        assert_eq!(twice.sql, once.sql);
        assert_eq!(twice.total_hits(), 0);
    }

    #[test]
    fn test_later_rules_see_earlier_output() {
        let mut rules = RuleSet::new();
        rules.push(Rule::new("a", "foo", Replacement::template("bar")).unwrap());
        rules.push(Rule::new("b", "bar", Replacement::template("baz")).unwrap());
        let out = DialectRewriter::new(rules).rewrite("foo");
        assert_eq!(out.sql, "baz");
    }

    #[test]
    fn test_empty_rule_set_passes_through() {
        let out = DialectRewriter::new(RuleSet::new()).rewrite("PRAGMA x;");
        assert_eq!(out.sql, "PRAGMA x;");
        assert!(out.rules.is_empty());
    }

    #[test]
    fn test_summary_serializes_without_sql() {
        let conversion = DialectRewriter::sqlite_to_postgres().rewrite("COMMIT;");
        let json = serde_json::to_value(&conversion).unwrap();
        assert!(json.get("sql").is_none());
        assert_eq!(json["rules"][0]["rule"], "strip-pragma");
    }
}
