//! Error types for pin index operations.

use thiserror::Error;

/// Errors that can occur during pin index operations.
#[derive(Debug, Error)]
pub enum PinError {
    /// The pin index file could not be parsed or written.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The pin index file contains an identifier that does not parse.
    #[error("invalid pinned identifier {text}: {reason}")]
    InvalidCid { text: String, reason: String },

    /// I/O error during file-based pin operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock protecting the in-memory pin sets was poisoned.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

/// Convenience type alias for pin operations.
pub type Result<T> = std::result::Result<T, PinError>;
