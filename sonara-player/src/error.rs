//! Error types for sonara-player
//!
//! Coordinator commands swallow these at their boundary (nothing playing is
//! the user-visible symptom); they surface only from setup code, the
//! preference store and the HTTP layer.

use thiserror::Error;

/// Main error type for sonara-player
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Preference database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Remote API transport errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stream lookup returned nothing playable
    #[error("Stream resolution failed: {0}")]
    Resolution(String),

    /// Native player call rejected
    #[error("Native player error: {0}")]
    Native(String),

    /// A newer play request took over the session
    #[error("Superseded by a newer play request")]
    Superseded,

    /// Queue lookups
    #[error("Queue error: {0}")]
    Queue(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Errors bubbling up from sonara-common
    #[error(transparent)]
    Common(#[from] sonara_common::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using sonara-player Error
pub type Result<T> = std::result::Result<T, Error>;
