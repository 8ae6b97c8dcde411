//! Pin index for cidfix.
//!
//! Pins tell the store's garbage collector which content to keep: a
//! recursive pin keeps a root and everything reachable from it, a direct pin
//! keeps one block. The pin index lives outside the block store and is only
//! durable after [`Pinner::flush`].
//!
//! # Modules
//!
//! - [`error`] — Error types for pin operations
//! - [`types`] — [`PinMode`]
//! - [`traits`] — The [`Pinner`] trait defining the index interface
//! - [`memory`] — In-memory [`InMemoryPinner`] for tests
//! - [`file`] — JSON-file [`FilePinner`]

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{PinError, Result};
pub use file::FilePinner;
pub use memory::{InMemoryPinner, PinSets};
pub use traits::Pinner;
pub use types::PinMode;
