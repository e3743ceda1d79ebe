use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the indexing and search pipeline.
///
/// Every variant is terminal for the pass that produced it; only `Fetch` is
/// worth retrying by the caller (see [`Error::is_retryable`]).
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to fetch {path}: {message}")]
    Fetch { path: String, message: String },

    #[error("no buildable Go source in {path} (tried {tried})")]
    NoBuildableSource { path: String, tried: String },

    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("cannot guess a package name for import path {0:?}")]
    UnresolvedSymbol(String),

    #[error("failed to write {key} to the index: {message}")]
    IndexWrite { key: String, message: String },

    #[error("index at {} is incompatible with schema v{expected}: {message}", path.display())]
    IncompatibleIndex { path: PathBuf, expected: u32, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("search failed: {0}")]
    Search(String),
}

/// Discriminant of [`Error`], for drivers that log "kind + message".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Fetch,
    NoBuildableSource,
    Parse,
    UnresolvedSymbol,
    IndexWrite,
    IncompatibleIndex,
    InvalidConfig,
    Search,
}

impl Error {
    pub fn fetch(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch { path: path.into(), message: message.to_string() }
    }

    pub fn parse(file: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse { file: file.into(), message: message.to_string() }
    }

    pub fn index_write(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::IndexWrite { key: key.into(), message: message.to_string() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::NoBuildableSource { .. } => ErrorKind::NoBuildableSource,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::UnresolvedSymbol(_) => ErrorKind::UnresolvedSymbol,
            Self::IndexWrite { .. } => ErrorKind::IndexWrite,
            Self::IncompatibleIndex { .. } => ErrorKind::IncompatibleIndex,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::Search(_) => ErrorKind::Search,
        }
    }

    /// Remote source may come back; everything else needs different input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fetch => "fetch",
            Self::NoBuildableSource => "no-buildable-source",
            Self::Parse => "parse",
            Self::UnresolvedSymbol => "unresolved-symbol",
            Self::IndexWrite => "index-write",
            Self::IncompatibleIndex => "incompatible-index",
            Self::InvalidConfig => "invalid-config",
            Self::Search => "search",
        };
        f.write_str(label)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
