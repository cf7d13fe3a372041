use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::repository::atomic_write;

/// Bounds symbolic reference recursion (§4.3): a chain longer than this is
/// treated the same as a cycle.
const MAX_RESOLUTION_DEPTH: u32 = 10;

/// A resolved reference is either a direct 40-hex hash, or absent.
pub struct RefStore {
    /// The repository's metadata directory; refs live under `refs/` and
    /// `HEAD` lives at its root.
    git_dir: PathBuf,
}

/// A `List` result: a leaf holds a resolved hash, a subdir nests further
/// entries, both preserved in lexicographic order per directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTree {
    Leaf(String),
    Dir(BTreeMap<String, RefTree>),
}

impl RefStore {
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        RefStore {
            git_dir: git_dir.into(),
        }
    }

    fn resolve_path(&self, path: &Path) -> Result<Option<String>> {
        self.resolve_path_depth(path, 0)
    }

    fn resolve_path_depth(&self, path: &Path, depth: u32) -> Result<Option<String>> {
        if depth > MAX_RESOLUTION_DEPTH {
            return Err(Error::ReferenceCycle(path.display().to_string()));
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        let content = content.strip_suffix('\n').unwrap_or(&content);

        if let Some(target) = content.strip_prefix("ref: ") {
            let target_path = self.git_dir.join(target);
            self.resolve_path_depth(&target_path, depth + 1)
        } else {
            Ok(Some(content.to_string()))
        }
    }

    /// Resolve a reference name relative to the metadata directory, e.g.
    /// `"HEAD"` or `"refs/heads/master"`.
    pub fn resolve(&self, name: &str) -> Result<Option<String>> {
        self.resolve_path(&self.git_dir.join(name))
    }

    /// Read a reference's immediate content without following it: `None` if
    /// absent, `Some(Direct(hash))` or `Some(Symbolic(target))` otherwise.
    pub fn read_immediate(&self, name: &str) -> Result<Option<RefValue>> {
        let path = self.git_dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        let content = content.strip_suffix('\n').unwrap_or(&content);
        Ok(Some(if let Some(target) = content.strip_prefix("ref: ") {
            RefValue::Symbolic(target.to_string())
        } else {
            RefValue::Direct(content.to_string())
        }))
    }

    /// Write a direct (lightweight) reference: `"{hex}\n"`.
    pub fn write_direct(&self, name: &str, hash: &str) -> Result<()> {
        atomic_write(self.git_dir.join(name), format!("{hash}\n").as_bytes())
    }

    /// Write a symbolic reference: `"ref: {target}\n"`.
    pub fn write_symbolic(&self, name: &str, target: &str) -> Result<()> {
        atomic_write(self.git_dir.join(name), format!("ref: {target}\n").as_bytes())
    }

    /// Recursively walk `refs/` and resolve every leaf to its ultimate hash.
    pub fn list(&self) -> Result<RefTree> {
        self.list_dir(&self.git_dir.join("refs"))
    }

    fn list_dir(&self, dir: &Path) -> Result<RefTree> {
        let mut map = BTreeMap::new();
        if !dir.is_dir() {
            return Ok(RefTree::Dir(map));
        }
        let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if path.is_dir() {
                map.insert(name, self.list_dir(&path)?);
            } else if let Some(hash) = self.resolve_path(&path)? {
                map.insert(name, RefTree::Leaf(hash));
            }
        }
        Ok(RefTree::Dir(map))
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefValue {
    Direct(String),
    Symbolic(String),
}
