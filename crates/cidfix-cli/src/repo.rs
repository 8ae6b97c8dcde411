//! Locating and opening a repository on disk.
//!
//! A repository is a directory holding a `blocks/` directory (one file per
//! block) and a `pins.json` pin index. The pin index may be absent.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use cidfix_pin::FilePinner;
use cidfix_store::FsBlockStore;

/// Environment variable naming the repository directory.
pub const REPO_ENV: &str = "CIDFIX_PATH";
/// Directory under `$HOME` used when nothing else is given.
pub const DEFAULT_DIR: &str = ".cidfix";

const BLOCKS_DIR: &str = "blocks";
const PINS_FILE: &str = "pins.json";

/// Pick the repository path: explicit flag, then `$CIDFIX_PATH`, then `$HOME/.cidfix`.
pub fn resolve(
    flag: Option<PathBuf>,
    env_path: Option<PathBuf>,
    home: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = flag.or(env_path) {
        return Ok(path);
    }
    match home {
        Some(home) => Ok(home.join(DEFAULT_DIR)),
        None => bail!("no repository given: pass --repo or set {REPO_ENV}"),
    }
}

/// [`resolve`] against the process environment.
pub fn resolve_from_env(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let env_path = std::env::var_os(REPO_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    resolve(flag, env_path, home)
}

/// An opened repository.
#[derive(Debug)]
pub struct Repo {
    pub root: PathBuf,
    pub blocks: FsBlockStore,
    pub pins: FilePinner,
}

impl Repo {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        if !root.is_dir() {
            bail!("no repository at {}", root.display());
        }
        let blocks = FsBlockStore::open(root.join(BLOCKS_DIR))
            .with_context(|| format!("opening blocks in {}", root.display()))?;
        let pins = FilePinner::load(root.join(PINS_FILE))
            .with_context(|| format!("loading pins in {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
            blocks,
            pins,
        })
    }
}
