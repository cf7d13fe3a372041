//! Materialize a tree to an empty destination directory (§4.11). The core
//! never touches HEAD or the index here — the caller chooses what, if
//! anything, a checkout means for those.

use std::fs;
#[cfg(unix)]
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::Path;

use crate::error::{Error, Result};
use crate::objects::ObjectStore;

/// Recursively write `tree_hash`'s contents into `destination`, which must
/// be empty or not yet exist.
pub fn checkout(store: &ObjectStore, tree_hash: &str, destination: &Path) -> Result<()> {
    if destination.exists() {
        let mut entries = fs::read_dir(destination)?;
        if entries.next().is_some() {
            return Err(Error::DestinationNotEmpty(destination.to_path_buf()));
        }
    } else {
        fs::create_dir_all(destination)?;
    }

    checkout_tree(store, tree_hash, destination)
}

fn checkout_tree(store: &ObjectStore, tree_hash: &str, destination: &Path) -> Result<()> {
    let object = store.read(tree_hash)?;
    let tree = object.as_tree().ok_or_else(|| Error::TypeMismatch {
        expected: "tree".into(),
        found: object.kind().as_str().into(),
    })?;

    for entry in &tree.entries {
        let target = destination.join(&entry.name);
        let child_hash = hex::encode(entry.hash);

        match entry.mode.as_str() {
            "40000" => {
                fs::create_dir_all(&target)?;
                checkout_tree(store, &child_hash, &target)?;
            }
            "120000" => {
                let blob_object = store.read(&child_hash)?;
                let blob = blob_object.as_blob().ok_or_else(|| Error::TypeMismatch {
                    expected: "blob".into(),
                    found: blob_object.kind().as_str().into(),
                })?;
                let link_target = String::from_utf8_lossy(&blob.data).into_owned();
                write_symlink(&link_target, &target)?;
            }
            "160000" => {
                // Gitlink: an opaque submodule-pointer leaf (§B.6). The
                // core does not fetch or materialize submodule content;
                // checkout skips it entirely.
            }
            mode => {
                let blob_object = store.read(&child_hash)?;
                let blob = blob_object.as_blob().ok_or_else(|| Error::TypeMismatch {
                    expected: "blob".into(),
                    found: blob_object.kind().as_str().into(),
                })?;
                fs::write(&target, &blob.data)?;
                set_mode(&target, mode)?;
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_symlink(link_target: &str, destination: &Path) -> Result<()> {
    symlink(link_target, destination)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_symlink(link_target: &str, destination: &Path) -> Result<()> {
    fs::write(destination, link_target)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: &str) -> Result<()> {
    if mode == "100755" {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: &str) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{EntryType, IndexEntry};
    use crate::objects::{Blob, GitObject};
    use crate::treebuilder::build_tree;
    use tempfile::tempdir;

    fn entry(name: &str, hash_byte: u8) -> IndexEntry {
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
            hash: [hash_byte; 20],
            assume_valid: false,
            stage: 0,
            name: name.to_string(),
        }
    }

    #[test]
    fn checkout_materializes_nested_files() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));

        let blob_id = store.write(&GitObject::Blob(Blob::new(b"hello\n".to_vec()))).unwrap();
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&hex::decode(&blob_id).unwrap());

        let mut files = entry("a/b.txt", 0);
        files.hash = raw;
        let tree_hash = build_tree(&store, &[files]).unwrap();

        let destination = dir.path().join("out");
        checkout(&store, &tree_hash, &destination).unwrap();

        assert_eq!(fs::read_to_string(destination.join("a/b.txt")).unwrap(), "hello\n");
    }

    #[test]
    fn checkout_rejects_nonempty_destination() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));
        let tree_hash = build_tree(&store, &[]).unwrap();

        let destination = dir.path().join("out");
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("existing"), b"x").unwrap();

        let err = checkout(&store, &tree_hash, &destination).unwrap_err();
        assert!(matches!(err, Error::DestinationNotEmpty(_)));
    }
}
