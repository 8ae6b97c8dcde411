use cidfix_types::{Cid, Codec, Multihash};

/// A block: raw bytes stored under their identifier.
///
/// The store never interprets `data`. Only the [`DagService`](crate::DagService)
/// decodes blocks, and only those tagged [`Codec::DAG_NODE`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    cid: Cid,
    data: Vec<u8>,
}

impl Block {
    /// Create a block, hashing `data` with the canonical hash function.
    pub fn new(codec: Codec, data: Vec<u8>) -> Self {
        let cid = Cid::new(codec, Multihash::blake3(&data));
        Self { cid, data }
    }

    /// Create a block under a caller-supplied identifier.
    ///
    /// No hash check is done, so relabeling keeps the original multihash
    /// whatever hash function produced it.
    pub fn with_cid(cid: Cid, data: Vec<u8>) -> Self {
        Self { cid, data }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
