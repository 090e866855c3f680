//! Errors callers branch on.
//!
//! Everything else travels as `anyhow::Error`; these enums exist so the CLI
//! and tests can tell a rejected upload or an LLM failure apart from an I/O
//! problem via `downcast_ref`.

use thiserror::Error;

/// Reasons an upload is refused before anything is written.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("File type {ext} not allowed. Allowed types: {allowed}")]
    UnsupportedFileType { ext: String, allowed: String },

    #[error("File size exceeds maximum allowed size of {max_mb}MB")]
    FileTooLarge { size: u64, max_mb: f64 },

    #[error("Filename is missing")]
    MissingFilename,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not set (expected environment variable {0})")]
    MissingApiKey(String),

    #[error("LLM API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM returned no text")]
    EmptyResponse,

    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),
}
