//! Layered ignore-pattern matching (§4.8). Rule syntax and matching are
//! delegated to the `ignore` crate's gitignore engine — so `\#`/`\!`
//! escapes, `!` negation, trailing-`/` directory restriction, and `**`
//! are all handled exactly as real Git parses them — but the *layering*
//! (scoped pass up the directory tree, then an absolute pass) is this
//! engine's own, per §4.8.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

pub struct IgnoreEngine {
    worktree_root: PathBuf,
    /// Repository-local `info/exclude`.
    repo_local: Option<Gitignore>,
    /// Global-user ignore file (lowest precedence).
    global: Option<Gitignore>,
}

impl IgnoreEngine {
    pub fn new(worktree_root: impl Into<PathBuf>) -> Self {
        IgnoreEngine {
            worktree_root: worktree_root.into(),
            repo_local: None,
            global: None,
        }
    }

    pub fn with_repo_local(mut self, exclude_file: &Path) -> Self {
        self.repo_local = build_from_file(self.worktree_root.clone(), exclude_file);
        self
    }

    pub fn with_global(mut self, global_file: &Path) -> Self {
        self.global = build_from_file(self.worktree_root.clone(), global_file);
        self
    }

    /// True if `relative_path` (worktree-relative, `/`-separated) is
    /// ignored under the scoped-then-absolute precedence rule.
    pub fn is_ignored(&self, relative_path: &str, is_dir: bool) -> bool {
        let absolute = self.worktree_root.join(relative_path);

        if let Some(verdict) = self.scoped_pass(&absolute, is_dir) {
            return verdict;
        }

        if let Some(repo_local) = &self.repo_local {
            match repo_local.matched(&absolute, is_dir) {
                ignore::Match::Ignore(_) => return true,
                ignore::Match::Whitelist(_) => return false,
                ignore::Match::None => {}
            }
        }

        if let Some(global) = &self.global {
            match global.matched(&absolute, is_dir) {
                ignore::Match::Ignore(_) => return true,
                ignore::Match::Whitelist(_) => return false,
                ignore::Match::None => {}
            }
        }

        false
    }

    /// Walk from `path`'s containing directory up to the worktree root,
    /// consulting each directory's own `.vesignore` file in isolation.
    /// The first directory whose file yields a verdict wins.
    fn scoped_pass(&self, path: &Path, is_dir: bool) -> Option<bool> {
        let mut dir = path.parent()?.to_path_buf();

        loop {
            let vesignore = dir.join(".vesignore");
            if vesignore.is_file() {
                if let Some(gi) = build_from_file(dir.clone(), &vesignore) {
                    match gi.matched(path, is_dir) {
                        ignore::Match::Ignore(_) => return Some(true),
                        ignore::Match::Whitelist(_) => return Some(false),
                        ignore::Match::None => {}
                    }
                }
            }

            if dir == self.worktree_root {
                return None;
            }
            match dir.parent() {
                Some(parent) if parent.starts_with(&self.worktree_root) || parent == self.worktree_root => {
                    dir = parent.to_path_buf();
                }
                _ => return None,
            }
        }
    }
}

fn build_from_file(base: PathBuf, file: &Path) -> Option<Gitignore> {
    if !file.is_file() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(base);
    builder.add(file);
    builder.build().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scoped_vesignore_wins_over_absolute_rules() {
        // S4: `.vesignore` at root has `*.log` then `!keep.log`; the
        // repo-local exclude separately matches `build/`.
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".vesignore"), "*.log\n!keep.log\n").unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join(".git_exclude"), "build/\n").unwrap();

        let engine = IgnoreEngine::new(dir.path())
            .with_repo_local(&dir.path().join(".git_exclude"));

        assert!(engine.is_ignored("build/out.log", false));
        assert!(!engine.is_ignored("keep.log", false));
        assert!(engine.is_ignored("anything.log", false));
    }

    #[test]
    fn no_matching_rule_is_not_ignored() {
        let dir = tempdir().unwrap();
        let engine = IgnoreEngine::new(dir.path());
        assert!(!engine.is_ignored("src/main.rs", false));
    }

    #[test]
    fn nested_vesignore_only_applies_within_its_own_subtree() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/.vesignore"), "*.tmp\n").unwrap();

        let engine = IgnoreEngine::new(dir.path());
        assert!(engine.is_ignored("sub/scratch.tmp", false));
        assert!(!engine.is_ignored("scratch.tmp", false));
    }

    #[test]
    fn double_star_crosses_path_separators() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".vesignore"), "**/target\n").unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();

        let engine = IgnoreEngine::new(dir.path());
        assert!(engine.is_ignored("a/b/target", true));
    }
}
