use cidfix_types::Cid;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from reading or writing linked nodes.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// No block is stored under the identifier.
    #[error("node not found: {0}")]
    NotFound(Cid),

    /// The block exists but does not decode as a linked node.
    #[error("failed to decode node {cid}: {reason}")]
    Decode { cid: Cid, reason: String },

    /// The underlying block store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DagError {
    /// Returns `true` for failures that concern one node's content rather than
    /// the health of the store: the block is missing or cannot be decoded.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Decode { .. })
    }
}

/// Result alias for linked-node operations.
pub type DagResult<T> = Result<T, DagError>;
