//! In-memory pin index for testing and ephemeral use.
//!
//! [`InMemoryPinner`] keeps both pin sets in `BTreeSet`s behind a `RwLock`.
//! [`flush`](Pinner::flush) copies the working set into a "persisted"
//! snapshot so tests can tell flushed state from unflushed state.

use std::collections::BTreeSet;
use std::sync::RwLock;

use cidfix_types::Cid;

use crate::error::{PinError, Result};
use crate::traits::Pinner;
use crate::types::PinMode;

/// The two pin sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PinSets {
    pub recursive: BTreeSet<Cid>,
    pub direct: BTreeSet<Cid>,
}

impl PinSets {
    pub fn set(&self, mode: PinMode) -> &BTreeSet<Cid> {
        match mode {
            PinMode::Recursive => &self.recursive,
            PinMode::Direct => &self.direct,
        }
    }

    pub fn set_mut(&mut self, mode: PinMode) -> &mut BTreeSet<Cid> {
        match mode {
            PinMode::Recursive => &mut self.recursive,
            PinMode::Direct => &mut self.direct,
        }
    }
}

/// An in-memory implementation of [`Pinner`].
#[derive(Debug, Default)]
pub struct InMemoryPinner {
    working: RwLock<PinSets>,
    persisted: RwLock<PinSets>,
}

impl InMemoryPinner {
    /// Create an empty pin index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pin index whose working and persisted sets both start as `sets`.
    pub fn with_sets(sets: PinSets) -> Self {
        Self {
            working: RwLock::new(sets.clone()),
            persisted: RwLock::new(sets),
        }
    }

    /// Copy of the working set.
    pub fn working(&self) -> Result<PinSets> {
        Ok(self.working.read().map_err(poisoned)?.clone())
    }

    /// Copy of the set as of the last flush.
    pub fn persisted(&self) -> Result<PinSets> {
        Ok(self.persisted.read().map_err(poisoned)?.clone())
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> PinError {
    PinError::Poisoned(e.to_string())
}

impl Pinner for InMemoryPinner {
    fn recursive_keys(&self) -> Result<Vec<Cid>> {
        let sets = self.working.read().map_err(poisoned)?;
        Ok(sets.recursive.iter().cloned().collect())
    }

    fn direct_keys(&self) -> Result<Vec<Cid>> {
        let sets = self.working.read().map_err(poisoned)?;
        Ok(sets.direct.iter().cloned().collect())
    }

    fn pin(&self, cid: &Cid, mode: PinMode) -> Result<()> {
        let mut sets = self.working.write().map_err(poisoned)?;
        sets.set_mut(mode).insert(cid.clone());
        Ok(())
    }

    fn unpin(&self, cid: &Cid, mode: PinMode) -> Result<bool> {
        let mut sets = self.working.write().map_err(poisoned)?;
        Ok(sets.set_mut(mode).remove(cid))
    }

    fn is_pinned(&self, cid: &Cid, mode: PinMode) -> Result<bool> {
        let sets = self.working.read().map_err(poisoned)?;
        Ok(sets.set(mode).contains(cid))
    }

    fn flush(&self) -> Result<()> {
        let working = self.working.read().map_err(poisoned)?.clone();
        *self.persisted.write().map_err(poisoned)? = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cidfix_types::{Codec, Multihash};

    fn cid(seed: &[u8]) -> Cid {
        Cid::new(Codec::DAG_NODE, Multihash::blake3(seed))
    }

    #[test]
    fn pin_and_list() {
        let pins = InMemoryPinner::new();
        pins.pin(&cid(b"a"), PinMode::Recursive).unwrap();
        pins.pin(&cid(b"b"), PinMode::Direct).unwrap();

        assert_eq!(pins.recursive_keys().unwrap(), vec![cid(b"a")]);
        assert_eq!(pins.direct_keys().unwrap(), vec![cid(b"b")]);
        assert_eq!(pins.keys(PinMode::Direct).unwrap(), vec![cid(b"b")]);
    }

    #[test]
    fn modes_are_independent() {
        let pins = InMemoryPinner::new();
        let c = cid(b"both");
        pins.pin(&c, PinMode::Recursive).unwrap();
        pins.pin(&c, PinMode::Direct).unwrap();

        assert!(pins.unpin(&c, PinMode::Direct).unwrap());
        assert!(pins.is_pinned(&c, PinMode::Recursive).unwrap());
        assert!(!pins.is_pinned(&c, PinMode::Direct).unwrap());
        assert!(!pins.unpin(&c, PinMode::Direct).unwrap());
    }

    #[test]
    fn pin_twice_is_noop() {
        let pins = InMemoryPinner::new();
        pins.pin(&cid(b"x"), PinMode::Recursive).unwrap();
        pins.pin(&cid(b"x"), PinMode::Recursive).unwrap();
        assert_eq!(pins.recursive_keys().unwrap().len(), 1);
    }

    #[test]
    fn flush_publishes_working_set() {
        let pins = InMemoryPinner::new();
        pins.pin(&cid(b"x"), PinMode::Recursive).unwrap();
        assert!(pins.persisted().unwrap().recursive.is_empty());

        pins.flush().unwrap();
        assert!(pins.persisted().unwrap().recursive.contains(&cid(b"x")));
        assert_eq!(pins.persisted().unwrap(), pins.working().unwrap());
    }
}
