use cidfix_types::Cid;

use crate::block::Block;
use crate::error::StoreResult;

/// A lazy stream over every identifier in a store.
pub type KeyStream<'a> = Box<dyn Iterator<Item = StoreResult<Cid>> + 'a>;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written; writing the same identifier twice
///   is a no-op.
/// - The store never interprets block contents.
/// - All I/O errors are propagated, never silently ignored.
/// - Mutating the store while a [`KeyStream`] is open is allowed. Keys added
///   after the stream was opened may or may not be yielded; a key is never
///   yielded twice.
pub trait BlockStore {
    /// Stream every stored identifier, in a backend-defined order.
    fn keys(&self) -> StoreResult<KeyStream<'_>>;

    /// Read a block by identifier.
    ///
    /// Returns `Ok(None)` if the block does not exist.
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>>;

    /// Store a block under its identifier.
    fn put(&self, block: &Block) -> StoreResult<()>;

    /// Delete a block. Returns `true` if the block existed.
    fn delete(&self, cid: &Cid) -> StoreResult<bool>;

    /// Check whether a block exists.
    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        Ok(self.get(cid)?.is_some())
    }
}
