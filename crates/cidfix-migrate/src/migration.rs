//! The orchestrator: one pass over the keyspace, then the pin index.

use tracing::{debug, info, warn};

use cidfix_pin::Pinner;
use cidfix_store::{BlockDagService, BlockStore};

use crate::config::MigrationConfig;
use crate::error::MigrateResult;
use crate::mapping::MappingTable;
use crate::observer::MigrationObserver;
use crate::pins::PinReconciler;
use crate::raw::RawBlockMigrator;
use crate::rewriter::DagRewriter;

/// Summary of a completed run.
#[derive(Clone, Debug, Default)]
pub struct MigrationReport {
    /// Identifiers enumerated from the store.
    pub keys_seen: usize,
    /// Legacy-raw blocks relabeled.
    pub blocks_relabeled: usize,
    /// Linked nodes stored under a new identifier.
    pub nodes_rewritten: usize,
    /// Linked nodes visited with nothing to change.
    pub nodes_unchanged: usize,
    /// Linked nodes that could not be loaded.
    pub nodes_skipped: usize,
    /// Pins moved to a new identifier.
    pub pins_changed: usize,
    /// Superseded linked nodes removed from the store.
    pub nodes_pruned: usize,
    /// Every decision made during the run.
    pub mapping: MappingTable,
}

impl MigrationReport {
    /// Returns `true` if the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.blocks_relabeled == 0
            && self.nodes_rewritten == 0
            && self.pins_changed == 0
            && self.nodes_pruned == 0
    }
}

/// A single migration run over one block store and one pin index.
pub struct Migration<'a> {
    store: &'a dyn BlockStore,
    pins: &'a dyn Pinner,
    config: MigrationConfig,
}

impl<'a> Migration<'a> {
    pub fn new(store: &'a dyn BlockStore, pins: &'a dyn Pinner, config: MigrationConfig) -> Self {
        Self {
            store,
            pins,
            config,
        }
    }

    /// Run the migration to completion.
    ///
    /// Any returned error aborts the run where it stands. Writes already made
    /// to the store are not rolled back, and the pin index is only flushed if
    /// the keyspace pass finished. Superseded nodes are removed last, once no
    /// pin refers to them.
    pub fn run(&self, observer: &mut dyn MigrationObserver) -> MigrateResult<MigrationReport> {
        let dag = BlockDagService::new(self.store);
        let mut mapping = MappingTable::new();
        let mut raw = RawBlockMigrator::new(self.store);
        let mut rewriter = DagRewriter::new(&dag, self.config.unreadable);
        let mut keys_seen = 0;

        info!(policy = ?self.config.unreadable, "starting keyspace pass");
        for key in self.store.keys()? {
            let cid = key?;
            keys_seen += 1;
            let codec = cid.codec();
            if codec.is_legacy_raw() {
                raw.migrate(&cid, &mut mapping, observer)?;
            } else if codec.is_dag_node() {
                rewriter.process(&cid, &mut mapping, observer)?;
            } else {
                debug!(cid = %cid.short(), "ignoring block");
            }
        }

        observer.pin_phase_started();
        let pins_changed = PinReconciler::new(self.pins).reconcile(&mapping, observer)?;

        let stats = rewriter.stats();
        let nodes_pruned = if stats.cycles == 0 {
            self.prune_superseded(&mapping)?
        } else {
            warn!(cycles = stats.cycles, "links close cycles; keeping superseded nodes");
            0
        };
        let report = MigrationReport {
            keys_seen,
            blocks_relabeled: raw.relabeled(),
            nodes_rewritten: stats.rewritten,
            nodes_unchanged: stats.unchanged,
            nodes_skipped: stats.skipped,
            pins_changed,
            nodes_pruned,
            mapping,
        };
        info!(
            keys = report.keys_seen,
            relabeled = report.blocks_relabeled,
            rewritten = report.nodes_rewritten,
            skipped = report.nodes_skipped,
            pins = report.pins_changed,
            pruned = report.nodes_pruned,
            "migration complete"
        );
        Ok(report)
    }

    /// Delete the old block of every rewritten linked node.
    ///
    /// Every stored parent of a rewritten node was enumerated and rewritten
    /// as well, so nothing readable still links to the old blocks.
    fn prune_superseded(&self, mapping: &MappingTable) -> MigrateResult<usize> {
        let mut pruned = 0;
        for (old, new) in mapping.rewrites() {
            if !old.codec().is_dag_node() {
                continue;
            }
            if self.store.delete(old)? {
                debug!(old = %old.short(), new = %new.short(), "removed superseded node");
                pruned += 1;
            }
        }
        Ok(pruned)
    }
}
