//! Progress callbacks for a migration run.

use cidfix_pin::PinMode;
use cidfix_store::DagError;
use cidfix_types::Cid;

/// Receives progress events as the run makes them.
///
/// Every method defaults to doing nothing.
pub trait MigrationObserver {
    /// A legacy-raw block was stored again under its canonical identifier.
    fn block_relabeled(&mut self, _old: &Cid, _new: &Cid) {}

    /// A linked node was rewritten and stored under a new identifier.
    fn node_rewritten(&mut self, _old: &Cid, _new: &Cid) {}

    /// A linked node could not be loaded and was left as is.
    fn node_skipped(&mut self, _cid: &Cid, _error: &DagError) {}

    /// The keyspace pass is done; pins are next.
    fn pin_phase_started(&mut self) {}

    /// A pin moved from `old` to `new` at `mode`.
    fn pin_changed(&mut self, _old: &Cid, _new: &Cid, _mode: PinMode) {}

    /// A legacy-raw pin whose block was not in the store was relabeled.
    fn pin_relabeled(&mut self, _old: &Cid, _new: &Cid, _mode: PinMode) {}
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl MigrationObserver for NoopObserver {}

/// Observer that records events in order, for tests and reports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingObserver {
    pub events: Vec<Event>,
}

/// One recorded observer event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    BlockRelabeled { old: Cid, new: Cid },
    NodeRewritten { old: Cid, new: Cid },
    NodeSkipped { cid: Cid },
    PinPhaseStarted,
    PinChanged { old: Cid, new: Cid, mode: PinMode },
    PinRelabeled { old: Cid, new: Cid, mode: PinMode },
}

impl MigrationObserver for RecordingObserver {
    fn block_relabeled(&mut self, old: &Cid, new: &Cid) {
        self.events.push(Event::BlockRelabeled {
            old: old.clone(),
            new: new.clone(),
        });
    }

    fn node_rewritten(&mut self, old: &Cid, new: &Cid) {
        self.events.push(Event::NodeRewritten {
            old: old.clone(),
            new: new.clone(),
        });
    }

    fn node_skipped(&mut self, cid: &Cid, _error: &DagError) {
        self.events.push(Event::NodeSkipped { cid: cid.clone() });
    }

    fn pin_phase_started(&mut self) {
        self.events.push(Event::PinPhaseStarted);
    }

    fn pin_changed(&mut self, old: &Cid, new: &Cid, mode: PinMode) {
        self.events.push(Event::PinChanged {
            old: old.clone(),
            new: new.clone(),
            mode,
        });
    }

    fn pin_relabeled(&mut self, old: &Cid, new: &Cid, mode: PinMode) {
        self.events.push(Event::PinRelabeled {
            old: old.clone(),
            new: new.clone(),
            mode,
        });
    }
}
