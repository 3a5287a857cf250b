//! # sqlite2pg
//!
//! Rewrites a SQLite dump into a script PostgreSQL will accept.
//!
//! The conversion is a fixed, ordered list of regex find/replace passes over
//! the whole text. No SQL is parsed, and the output is not validated: anything
//! the rules don't cover is copied through unchanged.
//!
//! ## Quick Example
//!
//! ```
//! let sql = "PRAGMA foreign_keys=ON;\nCREATE TABLE logs (id INTEGER PRIMARY KEY AUTOINCREMENT);";
//! assert_eq!(
//!     sqlite2pg::convert(sql),
//!     "\nCREATE TABLE IF NOT EXISTS logs (id SERIAL PRIMARY KEY);"
//! );
//! ```
//!
//! See [`rules`] for the rule table.

pub mod config;
pub mod error;
pub mod rewriter;
pub mod rules;

pub use config::Config;
pub use error::{ConvertError, ConvertResult};
pub use rewriter::{Conversion, DialectRewriter, RuleHit, convert_file};
pub use rules::{Replacement, Rule, RuleSet};

pub mod prelude {
    pub use crate::config::{Config, ConfigBuilder};
    pub use crate::error::*;
    pub use crate::rewriter::{Conversion, DialectRewriter, RuleHit, convert_file, read_script};
    pub use crate::rules::{Replacement, Rule, RuleSet};
}

/// Rewrite a SQLite script with the built-in rules.
pub fn convert(sql: &str) -> String {
    DialectRewriter::sqlite_to_postgres().rewrite(sql).sql
}
