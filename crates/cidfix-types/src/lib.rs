//! Foundation types for cidfix.
//!
//! Every other cidfix crate depends on `cidfix-types` for the identifier that
//! keys the block store and the pin index.
//!
//! # Key Types
//!
//! - [`Cid`] — Content identifier: codec tag plus multihash
//! - [`Codec`] — Codec tag, with the three values the migration cares about
//! - [`Multihash`] — Hash function code plus digest
//! - [`rewrite`] — The legacy-raw to canonical-raw relabeling rule

pub mod cid;
pub mod error;

pub use cid::{rewrite, Cid, Codec, Multihash};
pub use error::TypeError;
