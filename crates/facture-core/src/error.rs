use std::path::PathBuf;

use thiserror::Error;

/// Error type shared across facture crates.
///
/// Every invariant violation is a `Conf` error carrying the message shown to
/// the user; there is no recovery path once one is raised.
#[derive(Debug, Error)]
pub enum FactureError {
    /// The configuration, or the data it declares, violates an invariant.
    #[error("{0}")]
    Conf(String),
    /// A target or configuration file could not be read or written.
    #[error("io error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FactureError {
    pub fn conf(message: impl Into<String>) -> Self {
        FactureError::Conf(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FactureError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results returned by facture crates.
pub type Result<T> = std::result::Result<T, FactureError>;
