//! The [`Pinner`] trait defining the pin index interface.

use cidfix_types::Cid;

use crate::error::Result;
use crate::types::PinMode;

/// A durable pin index, kept separately from the block store.
///
/// `pin` and `unpin` change the working set only; nothing is durable until
/// [`flush`](Pinner::flush) returns `Ok`.
pub trait Pinner {
    /// All recursively pinned roots, sorted.
    fn recursive_keys(&self) -> Result<Vec<Cid>>;

    /// All directly pinned blocks, sorted.
    fn direct_keys(&self) -> Result<Vec<Cid>>;

    /// Pin `cid` at `mode`. Pinning an already pinned identifier is a no-op.
    fn pin(&self, cid: &Cid, mode: PinMode) -> Result<()>;

    /// Remove the pin on `cid` at `mode`. Returns `true` if it was pinned.
    fn unpin(&self, cid: &Cid, mode: PinMode) -> Result<bool>;

    /// Check whether `cid` is pinned at `mode`.
    fn is_pinned(&self, cid: &Cid, mode: PinMode) -> Result<bool>;

    /// Persist the working set.
    fn flush(&self) -> Result<()>;

    /// Keys pinned at `mode`.
    fn keys(&self, mode: PinMode) -> Result<Vec<Cid>> {
        match mode {
            PinMode::Recursive => self.recursive_keys(),
            PinMode::Direct => self.direct_keys(),
        }
    }
}
