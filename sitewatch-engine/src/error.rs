//! Error types for sitewatch-engine
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. No failure here is fatal to the engine process: input
//! defects map to rejected submissions, upstream unavailability degrades to
//! "no detections" or "not persisted".

use thiserror::Error;

/// Common result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sitewatch-engine module
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Detector service errors
    #[error("Detector error: {0}")]
    Detector(String),

    /// Invalid submission (missing mandatory identity fields)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised by the shared library
    #[error(transparent)]
    Shared(#[from] sitewatch_common::Error),
}
