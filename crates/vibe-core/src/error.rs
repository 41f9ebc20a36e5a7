//! Error types for vibe-os.

use thiserror::Error;

/// Result type alias using vibe-os's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vibe-os operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Selected media exceeds the upload limit. Nothing was ingested.
    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// Both analysis tiers failed, or the response was not a valid report.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// Remote response did not satisfy the report schema.
    #[error("Schema violation: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    /// Dossier capture or assembly failed
    #[error("Export error: {0}")]
    Export(String),

    /// Stored history could not be read. Callers degrade to empty history.
    #[error("History load error: {0}")]
    HistoryLoad(String),

    /// Transition not permitted from the current session state
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures the user can fix by choosing different media.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, Error::FileTooLarge { .. } | Error::InvalidInput(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
