//! Unstage one or more paths, optionally deleting them from the worktree
//! too (§4.5 Remove).

use anyhow::Result;

use crate::repo;

pub fn run(paths: &[String], cached: bool) -> Result<()> {
    let opened = repo::discover()?;
    let mut index = repo::read_index(&opened.repo)?;

    for path in paths {
        let removed = vesigit_core::worktree::remove(opened.repo.worktree(), &mut index, path, !cached)?;
        tracing::debug!(path, removed, "unstaged path");
    }

    repo::write_index(&opened.repo, &index)?;
    Ok(())
}
