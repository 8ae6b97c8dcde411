use thiserror::Error;

/// Errors produced when parsing identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unsupported multibase prefix: {0:?}")]
    InvalidMultibase(Option<char>),

    #[error("unsupported identifier version: {0}")]
    UnsupportedVersion(u64),

    #[error("truncated or oversized varint")]
    InvalidVarint,
}
