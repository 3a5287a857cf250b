//! Error types for sqlite2pg.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for conversion operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reading or writing a file failed.
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule pattern failed to compile.
    #[error("Invalid pattern for rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A rule name that is not part of the built-in table.
    #[error("Unknown rule: '{0}'. Run `sqlite2pg rules` to list rule names")]
    UnknownRule(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No input path on the command line or in the config.
    #[error("No input file given. Pass a path or set `input` in sqlite2pg.toml")]
    MissingInput,
}

impl ConvertError {
    /// Wrap an IO error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid pattern error.
    pub fn pattern(rule: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            rule: rule.into(),
            source,
        }
    }
}

/// Result type alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
