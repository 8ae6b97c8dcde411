//! Filesystem block store.
//!
//! Layout:
//!
//! ```text
//! <root>/<shard>/<cid text form>
//! ```
//!
//! where `<shard>` is the two characters before the last character of the
//! text form. Writes go through a temporary file in `<root>` followed by a
//! rename, so a crash never leaves a partially written block under its final
//! name.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use cidfix_types::Cid;

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::traits::{BlockStore, KeyStream};

/// Block store keeping one file per block under a root directory.
#[derive(Debug)]
pub struct FsBlockStore {
    root: PathBuf,
}

impl FsBlockStore {
    /// Open an existing block directory.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("block directory {} does not exist", root.display()),
            )));
        }
        Ok(Self { root })
    }

    /// Create the block directory if needed and open it.
    pub fn create(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, cid: &Cid) -> PathBuf {
        let name = cid.to_text();
        let end = name.len() - 1;
        self.root.join(&name[end - 2..end]).join(name)
    }
}

impl BlockStore for FsBlockStore {
    fn keys(&self) -> StoreResult<KeyStream<'_>> {
        let walker = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .into_iter();

        let stream = walker.filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(StoreError::Io(e.into()))),
            };
            if !entry.file_type().is_file() {
                return None;
            }
            let name = entry.file_name().to_string_lossy();
            match name.parse::<Cid>() {
                Ok(cid) => Some(Ok(cid)),
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "skipping non-block file");
                    None
                }
            }
        });
        Ok(Box::new(stream))
    }

    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>> {
        match fs::read(self.block_path(cid)) {
            Ok(data) => Ok(Some(Block::with_cid(cid.clone(), data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, block: &Block) -> StoreResult<()> {
        let path = self.block_path(block.cid());
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(block.data())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        debug!(cid = %block.cid().short(), bytes = block.len(), "block written");
        Ok(())
    }

    fn delete(&self, cid: &Cid) -> StoreResult<bool> {
        match fs::remove_file(self.block_path(cid)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        Ok(self.block_path(cid).is_file())
    }
}
