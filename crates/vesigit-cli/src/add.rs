//! Stage one or more worktree-relative paths into the index: hash each
//! file's current content as a blob, write it, and fold the result into the
//! index the way real `git add` does.

use anyhow::{Context, Result};

use crate::repo;

pub fn run(paths: &[String]) -> Result<()> {
    let opened = repo::discover()?;
    let mut index = repo::read_index(&opened.repo)?;

    for path in paths {
        let hash = vesigit_core::worktree::add(opened.repo.worktree(), &opened.store, &mut index, path)
            .with_context(|| format!("adding {path}"))?;
        tracing::debug!(path, hash, "staged path");
    }

    repo::write_index(&opened.repo, &index)?;
    Ok(())
}
