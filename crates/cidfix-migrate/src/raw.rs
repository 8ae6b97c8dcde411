//! Relabeling of legacy-raw blocks.

use tracing::debug;

use cidfix_store::{Block, BlockStore};
use cidfix_types::{rewrite, Cid};

use crate::error::{MigrateError, MigrateResult};
use crate::mapping::MappingTable;
use crate::observer::MigrationObserver;

/// Moves legacy-raw blocks to their canonical-raw identifiers.
///
/// Every failure here is fatal: later steps assume the canonical block
/// exists once the mapping says so.
pub struct RawBlockMigrator<'a> {
    store: &'a dyn BlockStore,
    relabeled: usize,
}

impl<'a> RawBlockMigrator<'a> {
    pub fn new(store: &'a dyn BlockStore) -> Self {
        Self {
            store,
            relabeled: 0,
        }
    }

    /// Relabel the block stored under `old`.
    ///
    /// Writes the bytes under the canonical identifier, deletes the old
    /// entry, and records `old -> new` in `mapping`. Identifiers that are not
    /// legacy-raw are returned unchanged and nothing is touched.
    pub fn migrate(
        &mut self,
        old: &Cid,
        mapping: &mut MappingTable,
        observer: &mut dyn MigrationObserver,
    ) -> MigrateResult<Cid> {
        if !old.codec().is_legacy_raw() {
            return Ok(old.clone());
        }

        let new = rewrite(old);
        let block = self
            .store
            .get(old)?
            .ok_or_else(|| MigrateError::MissingBlock(old.clone()))?;

        self.store.put(&Block::with_cid(new.clone(), block.into_data()))?;
        self.store.delete(old)?;
        mapping.set(old.clone(), Some(new.clone()));

        debug!(old = %old.short(), new = %new.short(), "relabeled raw block");
        observer.block_relabeled(old, &new);
        self.relabeled += 1;
        Ok(new)
    }

    /// Number of blocks relabeled so far.
    pub fn relabeled(&self) -> usize {
        self.relabeled
    }
}
