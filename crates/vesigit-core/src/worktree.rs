//! Bridges the working directory to the index and object store: stat
//! capture, add/remove, and the narrow stat-comparison rule used by the
//! status engine (§9 Design Notes — only mtime_s/mtime_ns/size/type+perm
//! bits participate in change detection; everything else is recorded for
//! round-trip fidelity but never compared).

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use crate::error::Result;
use crate::index::{validate_path, EntryType, Index, IndexEntry};
use crate::objects::{Blob, GitObject, ObjectStore};

/// The subset of filesystem stat fields the status engine is allowed to
/// compare for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparableStat {
    pub mtime_s: u32,
    pub mtime_n: u32,
    pub size: u32,
    pub entry_type: EntryType,
    pub perm: u32,
}

pub fn stat_entry(path: &Path) -> Result<IndexEntry> {
    let metadata = fs::symlink_metadata(path)?;
    let (entry_type, perm) = classify(&metadata);

    Ok(IndexEntry {
        ctime_s: metadata.ctime() as u32,
        ctime_n: metadata.ctime_nsec() as u32,
        mtime_s: metadata.mtime() as u32,
        mtime_n: metadata.mtime_nsec() as u32,
        dev: metadata.dev() as u32,
        ino: metadata.ino() as u32,
        entry_type,
        perm,
        uid: metadata.uid(),
        gid: metadata.gid(),
        size: metadata.size() as u32,
        hash: [0u8; 20],
        assume_valid: false,
        stage: 0,
        name: String::new(),
    })
}

fn classify(metadata: &fs::Metadata) -> (EntryType, u32) {
    if metadata.file_type().is_symlink() {
        (EntryType::Symlink, 0)
    } else if metadata.file_type().is_dir() {
        // A gitlink (submodule mount point) looks like a directory from
        // the worktree's perspective; the tree builder is what actually
        // decides an entry is a gitlink (by pre-existing index/tree data),
        // not worktree stat alone.
        (EntryType::Gitlink, 0)
    } else {
        let mode = metadata.permissions().mode();
        let perm = if mode & 0o111 != 0 { 0o755 } else { 0o644 };
        (EntryType::Regular, perm)
    }
}

pub fn comparable(entry: &IndexEntry) -> ComparableStat {
    ComparableStat {
        mtime_s: entry.mtime_s,
        mtime_n: entry.mtime_n,
        size: entry.size,
        entry_type: entry.entry_type,
        perm: entry.perm,
    }
}

/// Hash `worktree_relative_path`'s current content as a blob, write it to
/// the object store, and stage it in `index` (§4.5 Add).
pub fn add(
    worktree_root: &Path,
    store: &ObjectStore,
    index: &mut Index,
    worktree_relative_path: &str,
) -> Result<String> {
    validate_path(worktree_relative_path)?;
    let absolute = worktree_root.join(worktree_relative_path);

    let data = fs::read(&absolute)?;
    let object = GitObject::Blob(Blob::new(data));
    let hash_hex = store.write(&object)?;
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&hex::decode(&hash_hex).expect("store returns valid hex"));

    let mut entry = stat_entry(&absolute)?;
    entry.name = worktree_relative_path.to_string();
    entry.hash = hash;

    index.upsert(entry);
    Ok(hash_hex)
}

/// Remove `name` from the index and, if requested, delete it from the
/// worktree too (§4.5 Remove).
pub fn remove(
    worktree_root: &Path,
    index: &mut Index,
    name: &str,
    also_delete_file: bool,
) -> Result<bool> {
    let removed = index.remove(name);
    if removed && also_delete_file {
        let absolute = worktree_root.join(name);
        if absolute.exists() {
            fs::remove_file(absolute)?;
        }
    }
    Ok(removed)
}
