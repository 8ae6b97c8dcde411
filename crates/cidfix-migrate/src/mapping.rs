//! The run-scoped mapping from old identifiers to their migration outcome.

use std::collections::HashMap;

use tracing::warn;

use cidfix_types::Cid;

/// The migration state of one identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mapping<'a> {
    /// Not visited yet in this run.
    Unprocessed,
    /// Visited; nothing had to change.
    Unchanged,
    /// Visited and replaced by a new identifier.
    Rewritten(&'a Cid),
}

/// Memo of every identifier the run has decided on.
///
/// Entries are write-once: the first decision recorded for an identifier is
/// final for the run, and there is no removal.
#[derive(Clone, Debug, Default)]
pub struct MappingTable {
    entries: HashMap<Cid, Option<Cid>>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a decision has been recorded for `cid`.
    pub fn has(&self, cid: &Cid) -> bool {
        self.entries.contains_key(cid)
    }

    /// The replacement for `cid`, if it was rewritten.
    pub fn get(&self, cid: &Cid) -> Option<&Cid> {
        self.entries.get(cid).and_then(Option::as_ref)
    }

    pub fn status(&self, cid: &Cid) -> Mapping<'_> {
        match self.entries.get(cid) {
            None => Mapping::Unprocessed,
            Some(None) => Mapping::Unchanged,
            Some(Some(new)) => Mapping::Rewritten(new),
        }
    }

    /// Record the decision for `old`: `Some(new)` if rewritten, `None` if
    /// unchanged.
    ///
    /// Returns `false` and keeps the existing entry if `old` was already
    /// recorded.
    pub fn set(&mut self, old: Cid, new: Option<Cid>) -> bool {
        if let Some(existing) = self.entries.get(&old) {
            warn!(cid = %old.short(), existing = ?existing, "mapping entry already recorded");
            return false;
        }
        self.entries.insert(old, new);
        true
    }

    /// Number of recorded decisions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of identifiers that were rewritten.
    pub fn rewritten_count(&self) -> usize {
        self.entries.values().filter(|v| v.is_some()).count()
    }

    /// All `(old, new)` pairs for rewritten identifiers, in no particular order.
    pub fn rewrites(&self) -> impl Iterator<Item = (&Cid, &Cid)> {
        self.entries
            .iter()
            .filter_map(|(old, new)| new.as_ref().map(|new| (old, new)))
    }
}
