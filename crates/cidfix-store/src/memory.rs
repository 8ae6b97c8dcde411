use std::collections::HashMap;
use std::sync::RwLock;

use cidfix_types::Cid;

use crate::block::Block;
use crate::error::StoreResult;
use crate::traits::{BlockStore, KeyStream};

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock` and
/// cloned on read/write. [`BlockStore::keys`] snapshots the key set, so the
/// store can be written while the stream is consumed.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Cid, Vec<u8>>>,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Return a sorted list of all identifiers in the store.
    pub fn all_cids(&self) -> Vec<Cid> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut cids: Vec<Cid> = map.keys().cloned().collect();
        cids.sort();
        cids
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn keys(&self) -> StoreResult<KeyStream<'_>> {
        Ok(Box::new(self.all_cids().into_iter().map(Ok)))
    }

    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map
            .get(cid)
            .map(|data| Block::with_cid(cid.clone(), data.clone())))
    }

    fn put(&self, block: &Block) -> StoreResult<()> {
        let mut map = self.blocks.write().expect("lock poisoned");
        map.entry(block.cid().clone())
            .or_insert_with(|| block.data().to_vec());
        Ok(())
    }

    fn delete(&self, cid: &Cid) -> StoreResult<bool> {
        let mut map = self.blocks.write().expect("lock poisoned");
        Ok(map.remove(cid).is_some())
    }

    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(cid))
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}
