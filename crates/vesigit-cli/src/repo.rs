//! Shared repository-discovery plumbing every subcommand starts from:
//! ascend from the current directory to find `.git`, then open the core's
//! object store, ref store, and index against it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use vesigit_core::index::Index;
use vesigit_core::objects::ObjectStore;
use vesigit_core::refs::RefStore;
use vesigit_core::repository::Repository;

use crate::config::GitConfigFile;

pub const GIT_DIR_NAME: &str = ".git";

pub struct OpenRepo {
    pub repo: Repository,
    pub store: ObjectStore,
    pub refs: RefStore,
}

/// Ascend from the current directory looking for `.git`, then open it.
pub fn discover() -> Result<OpenRepo> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let git_dir = Repository::find(&cwd, GIT_DIR_NAME).context("not a vesigit repository (or any of the parent directories)")?;
    open_at(git_dir)
}

pub fn open_at(git_dir: PathBuf) -> Result<OpenRepo> {
    let identity = Box::new(GitConfigFile::load(&git_dir));
    let repo = Repository::open(&git_dir, identity).context("opening repository")?;
    let store = ObjectStore::new(repo.objects_dir());
    let refs = RefStore::new(repo.git_dir());
    tracing::debug!(git_dir = %repo.git_dir().display(), "opened repository");
    Ok(OpenRepo { repo, store, refs })
}

pub fn read_index(repo: &Repository) -> Result<Index> {
    Index::read(&repo.index_path()).context("reading index")
}

pub fn write_index(repo: &Repository, index: &Index) -> Result<()> {
    index.write(&repo.index_path()).context("writing index")
}
