//! Gemini-specific error handling.

use vibe_core::Error;

/// Classified failure from the Gemini REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Missing or rejected API key.
    AuthenticationError,
    /// Quota exhausted or rate limited.
    QuotaExhausted,
    /// Model not found or not enabled for the key.
    ModelNotFound,
    /// Request rejected as malformed (bad schema, unsupported MIME type).
    InvalidArgument,
    /// Server-side failure.
    ServerError,
    Unknown,
}

impl GeminiErrorCode {
    /// Determine error code from HTTP status and canonical status string.
    pub fn from_response(status: u16, canonical: &str) -> Self {
        match (status, canonical) {
            (401, _) | (403, _) | (_, "UNAUTHENTICATED") | (_, "PERMISSION_DENIED") => {
                Self::AuthenticationError
            }
            (429, _) | (_, "RESOURCE_EXHAUSTED") => Self::QuotaExhausted,
            (404, _) | (_, "NOT_FOUND") => Self::ModelNotFound,
            (400, _) | (_, "INVALID_ARGUMENT") | (_, "FAILED_PRECONDITION") => {
                Self::InvalidArgument
            }
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Convert a classified Gemini error to a vibe-os Error.
pub fn to_vibe_error(code: GeminiErrorCode, model: &str, message: &str) -> Error {
    match code {
        GeminiErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed for {}: {}", model, message))
        }
        GeminiErrorCode::QuotaExhausted => {
            Error::Request(format!("Quota exhausted for {}: {}", model, message))
        }
        GeminiErrorCode::ModelNotFound => {
            Error::Config(format!("Model not found: {}: {}", model, message))
        }
        GeminiErrorCode::InvalidArgument => {
            Error::InvalidInput(format!("Rejected by {}: {}", model, message))
        }
        GeminiErrorCode::ServerError => {
            Error::Request(format!("Server error from {}: {}", model, message))
        }
        GeminiErrorCode::Unknown => Error::Request(format!("{}: {}", model, message)),
    }
}
