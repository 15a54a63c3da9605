mod add;
mod commit;
pub mod database;
mod log;
pub mod refs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;

use crate::error::{Error, IoContext, Result};
use database::Database;
use refs::Refs;

/// Name of the store directory inside a working directory.
pub const STORE_DIR: &str = ".tinygit";

/// The branch HEAD points at after `init`.
pub const DEFAULT_BRANCH: &str = "master";

pub struct Repo {
    dir: Utf8PathBuf,
    store_root: Utf8PathBuf,
    pub database: Database,
    pub refs: Refs,
}

impl Repo {
    fn new(dir: Utf8PathBuf) -> Self {
        let store_root = dir.join(STORE_DIR);
        Self {
            database: Database::new(&store_root),
            refs: Refs::new(&store_root),
            dir,
            store_root,
        }
    }

    /// Create the store layout under `dir` and point HEAD at the default branch.
    ///
    /// Running this on an existing store does nothing.
    pub fn init(dir: impl AsRef<Utf8Path>) -> Result<Self> {
        let repo = Self::new(dir.as_ref().to_owned());
        trace!(path = ?repo.dir, "Initialising repo");

        if repo.store_root.is_dir() {
            warn!(path = ?repo.store_root, "Repo already exists, init will do nothing");
            return Ok(repo);
        }

        for d in [repo.database.root(), repo.refs.heads_path()] {
            trace!(path = ?d, "Creating directory");
            std::fs::create_dir_all(d).at(d)?;
        }
        repo.refs.init_head(DEFAULT_BRANCH)?;

        Ok(repo)
    }

    /// Open the store under `dir`.
    pub fn open(dir: impl AsRef<Utf8Path>) -> Result<Self> {
        let repo = Self::new(dir.as_ref().to_owned());
        if !repo.store_root.is_dir() {
            return Err(Error::NotARepository(repo.dir));
        }
        trace!(path = ?repo.dir, "Opened repo");
        Ok(repo)
    }

    pub fn store_root(&self) -> &Utf8Path {
        &self.store_root
    }
}
