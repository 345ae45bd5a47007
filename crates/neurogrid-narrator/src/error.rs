//! Error types for narrator requests.
//!
//! These never leave the crate through `Narrator`; they exist so generators
//! can report what went wrong for the diagnostic trace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NarratorError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("connection failed: {0}")]
    Connect(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(String),

    #[error("service returned status {0}")]
    Status(u16),

    #[error("response exceeded {0} bytes")]
    TooLarge(usize),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("empty response")]
    Empty,

    #[error("narrator offline")]
    Offline,
}
