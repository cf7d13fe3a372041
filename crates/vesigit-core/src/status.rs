//! Three-way diff between the HEAD tree, the index, and the working
//! directory (§4.9). Read-only and side-effect-free: nothing here writes
//! to the repository.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::ignore::IgnoreEngine;
use crate::index::Index;
use crate::objects::ObjectStore;
use crate::refs::{RefStore, RefValue};
use crate::worktree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: String,
    pub kind: ChangeKind,
}

/// What HEAD currently names: a branch (which may not have a commit yet)
/// or a detached commit hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Named(String),
    Detached(String),
    /// HEAD is symbolic to a branch that has no commits yet (the
    /// brand-new-repository case, §4.1 Create / §4.3 HEAD semantics).
    Unborn(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub branch: Branch,
    /// HEAD → index.
    pub staged: Vec<Change>,
    /// index → working directory.
    pub unstaged: Vec<Change>,
    /// Present on disk, absent from the index, not ignored.
    pub untracked: Vec<String>,
}

/// Flatten a tree to `path -> raw 20-byte hash`, recursing into subtrees
/// (mode `40000`). Gitlink entries (mode `160000`) are included as opaque
/// leaves, never recursed into (§B.6 supplemented gitlink pass-through).
fn flatten_tree(store: &ObjectStore, tree_hash: &str, prefix: &str, out: &mut BTreeMap<String, [u8; 20]>) -> Result<()> {
    let object = store.read(tree_hash)?;
    let tree = object
        .as_tree()
        .ok_or_else(|| crate::error::Error::TypeMismatch {
            expected: "tree".into(),
            found: object.kind().as_str().into(),
        })?;

    for entry in &tree.entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        if entry.is_subtree() {
            flatten_tree(store, &hex::encode(entry.hash), &path, out)?;
        } else {
            out.insert(path, entry.hash);
        }
    }
    Ok(())
}

fn staged_changes(store: &ObjectStore, head_tree: Option<&str>, index: &Index) -> Result<Vec<Change>> {
    let mut head_map = BTreeMap::new();
    if let Some(tree_hash) = head_tree {
        flatten_tree(store, tree_hash, "", &mut head_map)?;
    }

    let mut changes = Vec::new();
    for entry in &index.entries {
        if entry.stage != 0 {
            continue;
        }
        match head_map.get(&entry.name) {
            Some(head_hash) if *head_hash == entry.hash => {}
            Some(_) => changes.push(Change {
                path: entry.name.clone(),
                kind: ChangeKind::Modified,
            }),
            None => changes.push(Change {
                path: entry.name.clone(),
                kind: ChangeKind::Added,
            }),
        }
    }

    let staged_names: std::collections::HashSet<&str> =
        index.entries.iter().filter(|e| e.stage == 0).map(|e| e.name.as_str()).collect();
    for path in head_map.keys() {
        if !staged_names.contains(path.as_str()) {
            changes.push(Change {
                path: path.clone(),
                kind: ChangeKind::Deleted,
            });
        }
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changes)
}

fn unstaged_changes(worktree_root: &Path, store: &ObjectStore, index: &Index) -> Result<Vec<Change>> {
    let mut changes = Vec::new();

    for entry in &index.entries {
        if entry.stage != 0 {
            continue;
        }
        let absolute = worktree_root.join(&entry.name);
        if !absolute.exists() {
            changes.push(Change {
                path: entry.name.clone(),
                kind: ChangeKind::Deleted,
            });
            continue;
        }

        let disk_entry = worktree::stat_entry(&absolute)?;
        if worktree::comparable(&disk_entry) == worktree::comparable(entry) {
            continue;
        }

        let data = std::fs::read(&absolute)?;
        let rehashed = store.hash(&crate::objects::GitObject::Blob(crate::objects::Blob::new(data)));
        let rehashed_bytes = hex::decode(&rehashed).expect("store returns valid hex");
        if rehashed_bytes == entry.hash {
            continue;
        }
        changes.push(Change {
            path: entry.name.clone(),
            kind: ChangeKind::Modified,
        });
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changes)
}

fn untracked_files(
    worktree_root: &Path,
    git_dir_name: &str,
    index: &Index,
    ignore: &IgnoreEngine,
) -> Result<Vec<String>> {
    let tracked: std::collections::HashSet<&str> = index.entries.iter().map(|e| e.name.as_str()).collect();
    let mut out = Vec::new();
    walk_untracked(worktree_root, worktree_root, git_dir_name, &tracked, ignore, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk_untracked(
    worktree_root: &Path,
    dir: &Path,
    git_dir_name: &str,
    tracked: &std::collections::HashSet<&str>,
    ignore: &IgnoreEngine,
    out: &mut Vec<String>,
) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_name = entry.file_name();
        if file_name == git_dir_name {
            continue;
        }

        let relative = path
            .strip_prefix(worktree_root)
            .expect("walked path is under the worktree root")
            .to_string_lossy()
            .replace('\\', "/");
        let is_dir = path.is_dir();

        if ignore.is_ignored(&relative, is_dir) {
            continue;
        }

        if is_dir {
            walk_untracked(worktree_root, &path, git_dir_name, tracked, ignore, out)?;
        } else if !tracked.contains(relative.as_str()) {
            out.push(relative);
        }
    }
    Ok(())
}

fn current_branch(refs: &RefStore) -> Result<Branch> {
    match refs.read_immediate("HEAD")? {
        None => Ok(Branch::Unborn("refs/heads/master".to_string())),
        Some(RefValue::Direct(hash)) => Ok(Branch::Detached(hash)),
        Some(RefValue::Symbolic(target)) => match refs.resolve(&target)? {
            Some(_) => Ok(Branch::Named(target)),
            None => Ok(Branch::Unborn(target)),
        },
    }
}

/// Compute the full three-way status report for a repository.
pub fn status(
    worktree_root: &Path,
    git_dir_name: &str,
    store: &ObjectStore,
    refs: &RefStore,
    index: &Index,
    ignore: &IgnoreEngine,
) -> Result<StatusReport> {
    let branch = current_branch(refs)?;

    let head_tree = match refs.resolve("HEAD")? {
        Some(commit_hash) => {
            let object = store.read(&commit_hash)?;
            let commit = object.as_commit().ok_or_else(|| crate::error::Error::TypeMismatch {
                expected: "commit".into(),
                found: object.kind().as_str().into(),
            })?;
            Some(commit.tree.clone())
        }
        None => None,
    };

    let staged = staged_changes(store, head_tree.as_deref(), index)?;
    let unstaged = unstaged_changes(worktree_root, store, index)?;
    let untracked = untracked_files(worktree_root, git_dir_name, index, ignore)?;

    Ok(StatusReport {
        branch,
        staged,
        unstaged,
        untracked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{EntryType, IndexEntry};
    use crate::objects::{Blob, GitObject};
    use crate::treebuilder::build_tree;
    use tempfile::tempdir;

    fn entry(name: &str, hash: [u8; 20]) -> IndexEntry {
        IndexEntry {
            ctime_s: 0,
            ctime_n: 0,
            mtime_s: 0,
            mtime_n: 0,
            dev: 0,
            ino: 0,
            entry_type: EntryType::Regular,
            perm: 0o644,
            uid: 0,
            gid: 0,
            size: 0,
            hash,
            assume_valid: false,
            stage: 0,
            name: name.to_string(),
        }
    }

    #[test]
    fn s5_three_way_status_scenario() {
        // HEAD: {a: H1, b: H2}. Index: {a: H1, c: H3}. Worktree: a (H1),
        // c (H3' != H3), d (untracked, unignored).
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));
        std::fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        let refs = RefStore::new(dir.path());

        let h1 = store.write(&GitObject::Blob(Blob::new(b"one".to_vec()))).unwrap();
        let h2 = store.write(&GitObject::Blob(Blob::new(b"two".to_vec()))).unwrap();
        let h3 = store.write(&GitObject::Blob(Blob::new(b"three".to_vec()))).unwrap();
        let h3_prime = store.write(&GitObject::Blob(Blob::new(b"three-prime".to_vec()))).unwrap();

        let raw = |hex_id: &str| -> [u8; 20] {
            let mut buf = [0u8; 20];
            buf.copy_from_slice(&hex::decode(hex_id).unwrap());
            buf
        };

        let mut head_index = Index::new();
        head_index.upsert(entry("a", raw(&h1)));
        head_index.upsert(entry("b", raw(&h2)));
        let head_tree = build_tree(&store, &head_index.entries).unwrap();

        let commit = crate::objects::Commit {
            tree: head_tree,
            parents: vec![],
            author: crate::objects::Signature::new("A U Thor", "a@u", 0, "+0000"),
            committer: crate::objects::Signature::new("A U Thor", "a@u", 0, "+0000"),
            message: b"first\n".to_vec(),
        };
        let commit_hash = store.write(&GitObject::Commit(commit)).unwrap();
        refs.write_direct("refs/heads/master", &commit_hash).unwrap();
        refs.write_symbolic("HEAD", "refs/heads/master").unwrap();

        let mut index = Index::new();
        index.upsert(entry("a", raw(&h1)));
        index.upsert(entry("c", raw(&h3)));

        std::fs::write(dir.path().join("a"), b"one").unwrap();
        std::fs::write(dir.path().join("c"), b"three-prime").unwrap();
        std::fs::write(dir.path().join("d"), b"new file").unwrap();
        let _ = h3_prime;

        let ignore = IgnoreEngine::new(dir.path());
        let report = status(dir.path(), ".git-nonexistent", &store, &refs, &index, &ignore).unwrap();

        assert!(report.staged.contains(&Change {
            path: "b".into(),
            kind: ChangeKind::Deleted
        }));
        assert!(report.staged.contains(&Change {
            path: "c".into(),
            kind: ChangeKind::Added
        }));
        assert!(report.unstaged.contains(&Change {
            path: "c".into(),
            kind: ChangeKind::Modified
        }));
        assert_eq!(report.untracked, vec!["d".to_string()]);
    }

    #[test]
    fn unborn_branch_when_head_has_no_commits_yet() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));
        std::fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        let refs = RefStore::new(dir.path());
        refs.write_symbolic("HEAD", "refs/heads/master").unwrap();

        let index = Index::new();
        let ignore = IgnoreEngine::new(dir.path());
        let report = status(dir.path(), ".git", &store, &refs, &index, &ignore).unwrap();
        assert_eq!(report.branch, Branch::Unborn("refs/heads/master".to_string()));
        assert!(report.staged.is_empty());
    }
}
