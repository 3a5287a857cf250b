//! Rewrite rules.
//!
//! A [`Rule`] is a compiled pattern plus a replacement. A [`RuleSet`] is an
//! ordered list of rules; every rule sees the output of the one before it.
//!
//! # Built-in table
//!
//! | Order | Name                    | SQLite                              | PostgreSQL                     |
//! |-------|-------------------------|-------------------------------------|--------------------------------|
//! | 1     | `strip-pragma`          | `PRAGMA ...;`                       | *(removed)*                    |
//! | 2     | `begin-transaction`     | `BEGIN TRANSACTION;`                | `BEGIN;`                       |
//! | 3     | `commit`                | `COMMIT;`                           | `COMMIT;`                      |
//! | 4     | `serial-primary-key`    | `INTEGER PRIMARY KEY AUTOINCREMENT` | `SERIAL PRIMARY KEY`           |
//! | 5     | `strip-autoincrement`   | `AUTOINCREMENT`                     | *(removed)*                    |
//! | 6     | `datetime-type`         | `DATETIME`                          | `TIMESTAMP`                    |
//! | 7     | `current-timestamp`     | `CURRENT_TIMESTAMP`                 | `NOW()`                        |
//! | 8     | `boolean-default-false` | `BOOLEAN DEFAULT 0`                 | `BOOLEAN DEFAULT FALSE`        |
//! | 9     | `boolean-default-true`  | `BOOLEAN DEFAULT 1`                 | `BOOLEAN DEFAULT TRUE`         |
//! | 10    | `insert-values`         | `INSERT INTO ... VALUES`            | *(unchanged)*                  |
//! | 11    | `check-constraint`      | `CHECK(...)`                        | *(unchanged)*                  |
//! | 12    | `create-table-guard`    | `CREATE TABLE [IF NOT EXISTS] t`    | `CREATE TABLE IF NOT EXISTS t` |

use std::borrow::Cow;
use std::fmt;

use regex::{Captures, Regex};

use crate::error::{ConvertError, ConvertResult};

/// What a rule puts in place of each match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Replacement text. `$name` and `${1}` refer to capture groups.
    Template(String),
    /// Re-emit the matched text as is.
    Identity,
}

impl Replacement {
    pub fn template(text: impl Into<String>) -> Self {
        Self::Template(text.into())
    }

    fn render(&self, caps: &Captures<'_>) -> String {
        match self {
            Self::Template(template) => {
                let mut dst = String::new();
                caps.expand(template, &mut dst);
                dst
            }
            Self::Identity => caps[0].to_string(),
        }
    }
}

impl fmt::Display for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(t) if t.is_empty() => write!(f, "(removed)"),
            Self::Template(t) => write!(f, "{}", t),
            Self::Identity => write!(f, "(unchanged)"),
        }
    }
}

/// A single find/replace pass.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Regex,
    replacement: Replacement,
}

impl Rule {
    /// Compile a rule. Fails if `pattern` is not a valid regex.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        replacement: Replacement,
    ) -> ConvertResult<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|e| ConvertError::pattern(name.clone(), e))?;
        Ok(Self {
            name,
            pattern,
            replacement,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    /// Replace every match in `sql`.
    ///
    /// Returns the rewritten text and the number of matches whose
    /// replacement differs from the matched text.
    pub fn apply<'t>(&self, sql: &'t str) -> (Cow<'t, str>, usize) {
        let mut hits = 0;
        let out = self.pattern.replace_all(sql, |caps: &Captures<'_>| {
            let replaced = self.replacement.render(caps);
            if replaced != caps[0] {
                hits += 1;
            }
            replaced
        });
        (out, hits)
    }
}

/// Built-in rule definition: name, pattern, replacement (`None` = identity).
type Builtin = (&'static str, &'static str, Option<&'static str>);

/// The SQLite to PostgreSQL table. Order matters: `serial-primary-key` must
/// run before `strip-autoincrement`.
const SQLITE_TO_POSTGRES: &[Builtin] = &[
    ("strip-pragma", r"PRAGMA.*?;", Some("")),
    ("begin-transaction", r"BEGIN TRANSACTION;", Some("BEGIN;")),
    ("commit", r"COMMIT;", Some("COMMIT;")),
    (
        "serial-primary-key",
        r"\bINTEGER PRIMARY KEY AUTOINCREMENT\b",
        Some("SERIAL PRIMARY KEY"),
    ),
    ("strip-autoincrement", r"\bAUTOINCREMENT\b", Some("")),
    ("datetime-type", r"\bDATETIME\b", Some("TIMESTAMP")),
    ("current-timestamp", r"\bCURRENT_TIMESTAMP\b", Some("NOW()")),
    (
        "boolean-default-false",
        r"\bBOOLEAN DEFAULT 0\b",
        Some("BOOLEAN DEFAULT FALSE"),
    ),
    (
        "boolean-default-true",
        r"\bBOOLEAN DEFAULT 1\b",
        Some("BOOLEAN DEFAULT TRUE"),
    ),
    // Double-quoted literals inside INSERT statements are left alone.
    // Whether they should become single-quoted is undecided.
    ("insert-values", r"INSERT INTO .*? VALUES", None),
    ("check-constraint", r"CHECK\((.*?)\)", None),
    // An existing guard is swallowed by the match and written back once.
    // A bare `IF` is never a table name, so a guard followed by a name the
    // pattern can't read leaves the statement untouched.
    (
        "create-table-guard",
        concat!(
            r"CREATE\s+TABLE\s+(?:(?i:IF\s+NOT\s+EXISTS)\s+)?",
            r"(?P<table>(?:\w{3,}|\w|[^\WIi]\w|[Ii][^\WFf])\b",
            r#"|"[^"]+"|\[[^\]]+\]|`[^`]+`)"#,
        ),
        Some("CREATE TABLE IF NOT EXISTS $table"),
    ),
];

/// An ordered list of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in SQLite to PostgreSQL rules, in order.
    pub fn sqlite_to_postgres() -> Self {
        let rules = SQLITE_TO_POSTGRES
            .iter()
            .map(|(name, pattern, replacement)| Rule {
                name: (*name).to_string(),
                pattern: Regex::new(pattern).expect("built-in pattern compiles"),
                replacement: match replacement {
                    Some(text) => Replacement::template(*text),
                    None => Replacement::Identity,
                },
            })
            .collect();
        Self { rules }
    }

    /// Names of the built-in rules, in order.
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        SQLITE_TO_POSTGRES.iter().map(|(name, _, _)| *name)
    }

    /// Append a rule after the existing ones.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Remove the rule called `name`.
    pub fn disable(&mut self, name: &str) -> ConvertResult<()> {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        if self.rules.len() == before {
            return Err(ConvertError::UnknownRule(name.to_string()));
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
