use std::path::PathBuf;

use thiserror::Error;

/// Configuration misuse reported at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Stopwords are matched against the case-folded token,
    /// so an entry with upper case characters can never match.
    #[error("stopword `{0}` is not lowercase")]
    StopwordNotLowercase(String),

    /// An explicit empty allow-list keeps nothing.
    #[error("`{0}` allow-list is empty")]
    EmptyAllowList(&'static str),

    /// A recognized option key carried the wrong kind of value.
    #[error("option `{key}` expects {expected}")]
    InvalidOption { key: String, expected: &'static str },

    #[error("phrase threshold must be finite, got {0}")]
    InvalidThreshold(f64),

    #[error("phrase delimiter must be non-empty and free of alphabetic characters")]
    InvalidDelimiter,

    /// Pruning ratio must lie in (0, 1].
    #[error("pruning ratio must be in (0, 1], got {0}")]
    InvalidRatio(f64),
}

/// Top-level error type of the crate.
///
/// Per-document read failures are not represented here: they are logged
/// and the document is treated as empty.
#[derive(Debug, Error)]
pub enum Error {
    /// The corpus directory could not be listed.
    #[error("cannot read corpus directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_cbor::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
