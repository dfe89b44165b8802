use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkError>;

/// Configuration and programming errors. Runtime link input never produces
/// one of these; the normalizer degrades instead.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("unsupported navigation action: {0:?} (expected push, replace or navigate)")]
    UnsupportedAction(String),

    #[error("invalid route pattern {pattern:?} for screen {screen}: {source}")]
    InvalidRoute {
        screen: String,
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
