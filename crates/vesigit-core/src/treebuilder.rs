//! Folds the flat, sorted index into a hierarchy of tree objects (§4.7).

use std::collections::HashMap;

use crate::error::Result;
use crate::index::{EntryType, IndexEntry};
use crate::objects::{GitObject, ObjectStore, Tree, TreeEntry};

fn tree_mode(entry: &IndexEntry) -> &'static str {
    match entry.entry_type {
        EntryType::Regular if entry.perm & 0o111 != 0 => "100755",
        EntryType::Regular => "100644",
        EntryType::Symlink => "120000",
        EntryType::Gitlink => "160000",
    }
}

fn split_dir(name: &str) -> (String, String) {
    match name.rsplit_once('/') {
        Some((dir, file)) => (dir.to_string(), file.to_string()),
        None => (String::new(), name.to_string()),
    }
}

fn parent_of(dir: &str) -> &str {
    match dir.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

/// Build the full tree hierarchy described by `entries` (stage-0 index
/// entries) and return the root tree's hash.
pub fn build_tree(store: &ObjectStore, entries: &[IndexEntry]) -> Result<String> {
    let mut dirs: Vec<String> = vec![String::new()];
    let mut files_in_dir: HashMap<String, Vec<(String, &'static str, [u8; 20])>> = HashMap::new();

    for entry in entries {
        let (dir, file) = split_dir(&entry.name);

        // Every proper prefix of `dir` must exist as a group too, even if
        // it carries no direct file children of its own.
        let mut prefix = dir.clone();
        loop {
            if !dirs.contains(&prefix) {
                dirs.push(prefix.clone());
            }
            if prefix.is_empty() {
                break;
            }
            prefix = parent_of(&prefix).to_string();
        }

        files_in_dir
            .entry(dir)
            .or_default()
            .push((file, tree_mode(entry), entry.hash));
    }

    let mut child_dirs: HashMap<String, Vec<String>> = HashMap::new();
    for dir in &dirs {
        if dir.is_empty() {
            continue;
        }
        child_dirs.entry(parent_of(dir).to_string()).or_default().push(dir.clone());
    }

    // Longest path first so a directory's subtrees are always already
    // built by the time the directory itself is assembled.
    dirs.sort_by_key(|d| std::cmp::Reverse(d.matches('/').count() + usize::from(!d.is_empty())));

    let mut dir_hash: HashMap<String, [u8; 20]> = HashMap::new();

    for dir in &dirs {
        let mut tree_entries = Vec::new();

        if let Some(files) = files_in_dir.get(dir) {
            for (name, mode, hash) in files {
                tree_entries.push(TreeEntry {
                    mode: mode.to_string(),
                    name: name.clone(),
                    hash: *hash,
                });
            }
        }

        if let Some(children) = child_dirs.get(dir) {
            for child in children {
                let (_, child_name) = split_dir(child);
                let hash = dir_hash
                    .get(child)
                    .copied()
                    .expect("subdirectory built before its parent");
                tree_entries.push(TreeEntry {
                    mode: "40000".to_string(),
                    name: child_name,
                    hash,
                });
            }
        }

        let tree = Tree::new(tree_entries);
        let id = store.write(&GitObject::Tree(tree))?;
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&hex::decode(&id).expect("object store returns valid hex"));
        dir_hash.insert(dir.clone(), raw);
    }

    let root = dir_hash
        .get("")
        .copied()
        .expect("root group always exists");
    Ok(hex::encode(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{EntryType, IndexEntry};
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
    fn empty_index_produces_the_well_known_empty_tree_hash() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let hash = build_tree(&store, &[]).unwrap();
        assert_eq!(hash, "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn single_top_level_file_produces_one_entry_tree() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let hash = build_tree(&store, &[entry("hello.txt", 0xab)]).unwrap();

        let object = store.read(&hash).unwrap();
        let tree = object.as_tree().unwrap();
        assert_eq!(tree.entries.len(), 1);
        assert_eq!(tree.entries[0].name, "hello.txt");
    }

    #[test]
    fn nested_paths_build_intermediate_directories() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let hash = build_tree(
            &store,
            &[entry("a/b/c.txt", 1), entry("a/d.txt", 2), entry("top.txt", 3)],
        )
        .unwrap();

        let root = store.read(&hash).unwrap();
        let root_tree = root.as_tree().unwrap();
        let names: Vec<_> = root_tree.entries.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"a"));
        assert!(names.contains(&"top.txt"));

        let a_entry = root_tree.entries.iter().find(|e| e.name == "a").unwrap();
        let a_tree = store.read(&hex::encode(a_entry.hash)).unwrap();
        let a_tree = a_tree.as_tree().unwrap();
        let a_names: Vec<_> = a_tree.entries.iter().map(|e| e.name.as_str()).collect();
        assert!(a_names.contains(&"b"));
        assert!(a_names.contains(&"d.txt"));
    }

    #[test]
    fn identical_subtrees_dedup_via_content_addressing() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let hash = build_tree(
            &store,
            &[entry("x/shared.txt", 9), entry("y/shared.txt", 9)],
        )
        .unwrap();

        let root = store.read(&hash).unwrap();
        let root_tree = root.as_tree().unwrap();
        let x = root_tree.entries.iter().find(|e| e.name == "x").unwrap();
        let y = root_tree.entries.iter().find(|e| e.name == "y").unwrap();
        assert_eq!(x.hash, y.hash);
    }
}
