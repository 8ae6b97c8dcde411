use tracing::debug;

use cidfix_types::Cid;

use crate::error::{DagError, DagResult};
use crate::node::LinkedNode;
use crate::traits::BlockStore;

/// Read and write linked nodes by identifier.
pub trait DagService {
    /// Fetch and decode the node stored under `cid`.
    fn get(&self, cid: &Cid) -> DagResult<LinkedNode>;

    /// Encode and store `node`, returning the identifier computed from the
    /// encoded bytes.
    fn add(&self, node: &LinkedNode) -> DagResult<Cid>;
}

/// [`DagService`] backed directly by a [`BlockStore`], with no network
/// fetching: a block that is not in the store is [`DagError::NotFound`].
pub struct BlockDagService<'a> {
    store: &'a dyn BlockStore,
}

impl<'a> BlockDagService<'a> {
    pub fn new(store: &'a dyn BlockStore) -> Self {
        Self { store }
    }
}

impl DagService for BlockDagService<'_> {
    fn get(&self, cid: &Cid) -> DagResult<LinkedNode> {
        if !cid.codec().is_dag_node() {
            return Err(DagError::Decode {
                cid: cid.clone(),
                reason: format!("codec {} is not a linked node", cid.codec()),
            });
        }
        let block = self
            .store
            .get(cid)?
            .ok_or_else(|| DagError::NotFound(cid.clone()))?;
        LinkedNode::decode(cid, block.data())
    }

    fn add(&self, node: &LinkedNode) -> DagResult<Cid> {
        let block = node.to_block()?;
        self.store.put(&block)?;
        debug!(cid = %block.cid().short(), links = node.links.len(), "node added");
        Ok(block.cid().clone())
    }
}
