use serde::{Deserialize, Serialize};

use cidfix_types::{Cid, Codec, Multihash};

use crate::block::Block;
use crate::error::{DagError, DagResult, StoreError, StoreResult};

/// A named, sized edge from a linked node to another block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Edge name (may be empty).
    pub name: String,
    /// Cumulative size of the target, as recorded by the writer.
    pub size: u64,
    /// Identifier of the target block.
    pub cid: Cid,
}

impl Link {
    pub fn new(name: impl Into<String>, size: u64, cid: Cid) -> Self {
        Self {
            name: name.into(),
            size,
            cid,
        }
    }
}

/// Decoded view of a block tagged [`Codec::DAG_NODE`].
///
/// Re-encoding a node with different links yields different bytes and
/// therefore a different identifier. A rewritten node is a new object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedNode {
    /// Ordered child links.
    pub links: Vec<Link>,
    /// Opaque payload.
    pub data: Vec<u8>,
}

impl LinkedNode {
    pub fn new(links: Vec<Link>, data: Vec<u8>) -> Self {
        Self { links, data }
    }

    /// Deterministic byte encoding.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode the bytes of the block stored under `cid`.
    pub fn decode(cid: &Cid, bytes: &[u8]) -> DagResult<Self> {
        bincode::deserialize(bytes).map_err(|e| DagError::Decode {
            cid: cid.clone(),
            reason: e.to_string(),
        })
    }

    /// Encode into a block whose identifier is computed from the new bytes.
    pub fn to_block(&self) -> StoreResult<Block> {
        Ok(Block::new(Codec::DAG_NODE, self.encode()?))
    }

    /// The identifier this node would be stored under.
    pub fn cid(&self) -> StoreResult<Cid> {
        Ok(Cid::new(Codec::DAG_NODE, Multihash::blake3(&self.encode()?)))
    }
}
