//! Reconciliation of the pin index with the run's rewrites.

use tracing::info;

use cidfix_pin::{PinMode, Pinner};
use cidfix_types::{rewrite, Cid};

use crate::error::MigrateResult;
use crate::mapping::MappingTable;
use crate::observer::MigrationObserver;

/// Moves pins from old identifiers to their replacements.
pub struct PinReconciler<'a> {
    pins: &'a dyn Pinner,
}

impl<'a> PinReconciler<'a> {
    pub fn new(pins: &'a dyn Pinner) -> Self {
        Self { pins }
    }

    /// Repin every recursive and direct pin whose identifier is legacy-raw or
    /// was rewritten, keeping its mode, then flush the index once.
    ///
    /// Returns the number of pins moved.
    pub fn reconcile(
        &self,
        mapping: &MappingTable,
        observer: &mut dyn MigrationObserver,
    ) -> MigrateResult<usize> {
        let mut changed = 0;
        for mode in [PinMode::Recursive, PinMode::Direct] {
            for old in self.pins.keys(mode)? {
                let Some(new) = replacement(&old, mapping) else {
                    continue;
                };
                self.pins.unpin(&old, mode)?;
                self.pins.pin(&new, mode)?;
                info!(old = %old.short(), new = %new.short(), %mode, "moved pin");
                // Legacy-raw pins with no block in this run are relabeled quietly.
                if mapping.has(&old) {
                    observer.pin_changed(&old, &new, mode);
                } else {
                    observer.pin_relabeled(&old, &new, mode);
                }
                changed += 1;
            }
        }

        self.pins.flush()?;
        Ok(changed)
    }
}

fn replacement(cid: &Cid, mapping: &MappingTable) -> Option<Cid> {
    if cid.codec().is_legacy_raw() {
        return Some(rewrite(cid));
    }
    mapping.get(cid).cloned()
}
