use anyhow::Result;
use vesigit_core::ignore::IgnoreEngine;

use crate::repo;

pub fn run(paths: &[String]) -> Result<()> {
    let opened = repo::discover()?;
    let worktree = opened.repo.worktree();

    let engine = IgnoreEngine::new(worktree)
        .with_repo_local(&opened.repo.path("info/exclude"))
        .with_global(&global_exclude_path());

    for path in paths {
        let absolute = opened.repo.worktree_path(path);
        let is_dir = absolute.is_dir();
        if engine.is_ignored(path, is_dir) {
            println!("{path}");
        }
    }
    Ok(())
}

fn global_exclude_path() -> std::path::PathBuf {
    std::env::var_os("HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_default()
        .join(".config/git/ignore")
}
