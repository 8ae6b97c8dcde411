//! In-place migration of legacy-raw identifiers in a block store.
//!
//! A run relabels every legacy-raw block to the canonical raw codec, rewrites
//! every linked node that (transitively) links to one, and moves pins to the
//! rewritten roots.
//!
//! - [`RawBlockMigrator`] -- relabels one legacy-raw block
//! - [`DagRewriter`] -- memoized, stack-based rewrite of linked nodes
//! - [`MappingTable`] -- the run's old-to-new decisions
//! - [`PinReconciler`] -- applies the decisions to the pin index
//! - [`Migration`] -- one pass over the keyspace, then the pins

pub mod config;
pub mod error;
pub mod mapping;
pub mod migration;
pub mod observer;
pub mod pins;
pub mod raw;
pub mod rewriter;

pub use config::{MigrationConfig, UnreadablePolicy};
pub use error::{MigrateError, MigrateResult};
pub use mapping::{Mapping, MappingTable};
pub use migration::{Migration, MigrationReport};
pub use observer::{Event, MigrationObserver, NoopObserver, RecordingObserver};
pub use pins::PinReconciler;
pub use raw::RawBlockMigrator;
pub use rewriter::{DagRewriter, RewriteStats};
