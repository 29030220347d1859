//! Error types shared across the history browser.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a search string into a match predicate.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Regex mode is on and the search string is not a valid pattern.
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failures from the history and favorites backing stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history database {path}: {source}")]
    Sqlite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The store found the command but did not remove every copy of it.
    #[error("{path} still holds {command:?} after deleting it")]
    DeletionRefused { path: PathBuf, command: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No path was configured and no default could be derived.
    #[error("cannot determine a default {what}; set it explicitly")]
    NoDefaultPath { what: &'static str },
}
