//! Error types for a migration run.

use cidfix_pin::PinError;
use cidfix_store::{DagError, StoreError};
use cidfix_types::Cid;

/// Errors that abort a migration run.
///
/// Recoverable conditions never reach this type: an unreadable linked node
/// is skipped by the rewriter unless [`UnreadablePolicy::Abort`] is set.
///
/// [`UnreadablePolicy::Abort`]: crate::config::UnreadablePolicy::Abort
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The block store failed to read, write, delete, or enumerate.
    #[error("block store error: {0}")]
    Store(#[from] StoreError),

    /// Storing or reading a linked node failed at the store level.
    #[error(transparent)]
    Dag(#[from] DagError),

    /// A legacy-raw key was enumerated but its block could not be read.
    #[error("block {0} listed by the store but not found")]
    MissingBlock(Cid),

    /// A linked node could not be loaded and the policy is to abort.
    #[error("unreadable node {cid}: {source}")]
    Unreadable {
        cid: Cid,
        #[source]
        source: DagError,
    },

    /// The pin index could not be read, updated, or flushed.
    #[error("pin index error: {0}")]
    Pin(#[from] PinError),
}

/// Convenience alias for migration results.
pub type MigrateResult<T> = Result<T, MigrateError>;
