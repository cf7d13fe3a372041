use anyhow::{Context, Result};
use vesigit_core::ignore::IgnoreEngine;
use vesigit_core::status::{self, Branch, ChangeKind};

use crate::repo;

pub fn run() -> Result<()> {
    let opened = repo::discover()?;
    let index = repo::read_index(&opened.repo)?;
    let worktree = opened.repo.worktree();

    let ignore = IgnoreEngine::new(worktree)
        .with_repo_local(&opened.repo.path("info/exclude"))
        .with_global(&global_exclude_path());

    let report = status::status(worktree, repo::GIT_DIR_NAME, &opened.store, &opened.refs, &index, &ignore)
        .context("computing status")?;

    match &report.branch {
        Branch::Named(name) => println!("On branch {}", strip_refs_heads(name)),
        Branch::Unborn(name) => println!("On branch {} (no commits yet)", strip_refs_heads(name)),
        Branch::Detached(hash) => println!("HEAD detached at {}", &hash[..12.min(hash.len())]),
    }

    if report.staged.is_empty() && report.unstaged.is_empty() && report.untracked.is_empty() {
        println!("nothing to commit, working tree clean");
        return Ok(());
    }

    if !report.staged.is_empty() {
        println!("\nChanges to be committed:");
        for change in &report.staged {
            println!("\t{}:   {}", kind_label(change.kind), change.path);
        }
    }

    if !report.unstaged.is_empty() {
        println!("\nChanges not staged for commit:");
        for change in &report.unstaged {
            println!("\t{}:   {}", kind_label(change.kind), change.path);
        }
    }

    if !report.untracked.is_empty() {
        println!("\nUntracked files:");
        for path in &report.untracked {
            println!("\t{path}");
        }
    }

    Ok(())
}

fn kind_label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => "new file",
        ChangeKind::Modified => "modified",
        ChangeKind::Deleted => "deleted",
    }
}

fn strip_refs_heads(name: &str) -> &str {
    name.strip_prefix("refs/heads/").unwrap_or(name)
}

fn global_exclude_path() -> std::path::PathBuf {
    std::env::var_os("HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_default()
        .join(".config/git/ignore")
}
