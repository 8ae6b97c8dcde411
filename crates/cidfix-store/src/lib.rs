//! Content-addressed block storage for cidfix.
//!
//! A block is an immutable byte payload stored under its [`Cid`]. Blocks
//! tagged with the linked-node codec decode into a [`LinkedNode`]: ordered
//! links to other blocks plus an opaque payload.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlockStore`] -- one file per block under a sharded directory
//!
//! [`BlockDagService`] layers node encoding on top of any backend.
//!
//! [`Cid`]: cidfix_types::Cid

pub mod block;
pub mod dag;
pub mod error;
pub mod fs;
pub mod memory;
pub mod node;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use block::Block;
pub use dag::{BlockDagService, DagService};
pub use error::{DagError, DagResult, StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use node::{Link, LinkedNode};
pub use traits::{BlockStore, KeyStream};
