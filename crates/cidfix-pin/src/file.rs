//! JSON-file pin index.
//!
//! The file holds both pin sets as text-form identifiers:
//!
//! ```json
//! { "recursive": ["f0170..."], "direct": [] }
//! ```
//!
//! Flushing writes a temporary file next to the index and renames it over
//! the old one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use cidfix_types::Cid;

use crate::error::{PinError, Result};
use crate::memory::{InMemoryPinner, PinSets};
use crate::traits::Pinner;
use crate::types::PinMode;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PinFile {
    #[serde(default)]
    recursive: Vec<String>,
    #[serde(default)]
    direct: Vec<String>,
}

/// A [`Pinner`] persisted as a JSON file.
#[derive(Debug)]
pub struct FilePinner {
    path: PathBuf,
    sets: InMemoryPinner,
}

impl FilePinner {
    /// Load the pin index at `path`. A missing file is an empty index.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let sets = match fs::read(&path) {
            Ok(bytes) => parse(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PinSets::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(
            path = %path.display(),
            recursive = sets.recursive.len(),
            direct = sets.direct.len(),
            "pin index loaded"
        );
        Ok(Self {
            path,
            sets: InMemoryPinner::with_sets(sets),
        })
    }
}

fn parse(bytes: &[u8]) -> Result<PinSets> {
    let file: PinFile =
        serde_json::from_slice(bytes).map_err(|e| PinError::Serialization(e.to_string()))?;
    let mut sets = PinSets::default();
    for (mode, texts) in [
        (PinMode::Recursive, file.recursive),
        (PinMode::Direct, file.direct),
    ] {
        for text in texts {
            let cid = text.parse::<Cid>().map_err(|e| PinError::InvalidCid {
                text: text.clone(),
                reason: e.to_string(),
            })?;
            sets.set_mut(mode).insert(cid);
        }
    }
    Ok(sets)
}

impl Pinner for FilePinner {
    fn recursive_keys(&self) -> Result<Vec<Cid>> {
        self.sets.recursive_keys()
    }

    fn direct_keys(&self) -> Result<Vec<Cid>> {
        self.sets.direct_keys()
    }

    fn pin(&self, cid: &Cid, mode: PinMode) -> Result<()> {
        self.sets.pin(cid, mode)
    }

    fn unpin(&self, cid: &Cid, mode: PinMode) -> Result<bool> {
        self.sets.unpin(cid, mode)
    }

    fn is_pinned(&self, cid: &Cid, mode: PinMode) -> Result<bool> {
        self.sets.is_pinned(cid, mode)
    }

    fn flush(&self) -> Result<()> {
        let sets = self.sets.working()?;
        let file = PinFile {
            recursive: sets.recursive.iter().map(Cid::to_text).collect(),
            direct: sets.direct.iter().map(Cid::to_text).collect(),
        };
        let json =
            serde_json::to_vec_pretty(&file).map_err(|e| PinError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| PinError::Io(e.error))?;

        self.sets.flush()?;
        debug!(path = %self.path.display(), "pin index flushed");
        Ok(())
    }
}
