use crate::error::{Error, Result};

/// Mode `40000` marks a subtree; every other mode is a leaf (blob, symlink,
/// or gitlink). Only the subtree distinction matters for canonical order.
pub const TREE_MODE: &str = "40000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub name: String,
    pub hash: [u8; 20],
}

impl TreeEntry {
    pub fn is_subtree(&self) -> bool {
        self.mode == TREE_MODE
    }

    /// The canonical sort key (§3): a subtree's name compares as if
    /// suffixed with `/`, so `"foo"` (a file) sorts before `"foo.txt"` but
    /// `"foo/"` (a directory named `foo`) sorts after it.
    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.clone().into_bytes();
        if self.is_subtree() {
            key.push(b'/');
        }
        key
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(mut entries: Vec<TreeEntry>) -> Tree {
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Tree { entries }
    }

    /// Checks invariant 2/3 (§3): canonical order and unique names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        let mut previous_key: Option<Vec<u8>> = None;
        for entry in &self.entries {
            if !seen.insert(entry.name.clone()) {
                return Err(Error::MalformedObject(
                    "tree".into(),
                    format!("duplicate entry name {:?}", entry.name),
                ));
            }
            let key = entry.sort_key();
            if let Some(prev) = &previous_key {
                if prev >= &key {
                    return Err(Error::MalformedObject(
                        "tree".into(),
                        "entries not in canonical order".into(),
                    ));
                }
            }
            previous_key = Some(key);
        }
        Ok(())
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.name.as_bytes());
            out.push(0);
            out.extend_from_slice(&entry.hash);
        }
        out
    }

    pub fn deserialize(payload: &[u8]) -> Result<Tree> {
        let mut entries = Vec::new();
        let mut pos = 0usize;
        while pos < payload.len() {
            let space = payload[pos..]
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| {
                    Error::MalformedObject("tree".into(), "missing mode/name separator".into())
                })?;
            let mode = std::str::from_utf8(&payload[pos..pos + space])
                .map_err(|_| Error::MalformedObject("tree".into(), "mode is not UTF-8".into()))?
                .to_string();
            let name_start = pos + space + 1;
            let nul = payload[name_start..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| {
                    Error::MalformedObject("tree".into(), "missing name terminator".into())
                })?;
            let name = std::str::from_utf8(&payload[name_start..name_start + nul])
                .map_err(|_| Error::MalformedObject("tree".into(), "name is not UTF-8".into()))?
                .to_string();
            let hash_start = name_start + nul + 1;
            if payload.len() < hash_start + 20 {
                return Err(Error::MalformedObject(
                    "tree".into(),
                    "truncated entry hash".into(),
                ));
            }
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&payload[hash_start..hash_start + 20]);
            entries.push(TreeEntry { mode, name, hash });
            pos = hash_start + 20;
        }
        Ok(Tree { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mode: &str, name: &str, byte: u8) -> TreeEntry {
        TreeEntry {
            mode: mode.to_string(),
            name: name.to_string(),
            hash: [byte; 20],
        }
    }

    #[test]
    fn directory_sorts_after_same_named_file() {
        // "foo" (file) < "foo.txt" < "foo/" (directory also named "foo")
        let tree = Tree::new(vec![
            entry(TREE_MODE, "foo", 1),
            entry("100644", "foo.txt", 2),
            entry("100644", "foo", 3),
        ]);
        let names: Vec<_> = tree.entries.iter().map(|e| (&e.name, e.mode.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (&"foo".to_string(), "100644"),
                (&"foo.txt".to_string(), "100644"),
                (&"foo".to_string(), TREE_MODE),
            ]
        );
    }

    #[test]
    fn round_trips_through_serialize_deserialize() {
        let tree = Tree::new(vec![entry("100644", "a.txt", 0xab), entry(TREE_MODE, "sub", 0xcd)]);
        let bytes = tree.serialize();
        let parsed = Tree::deserialize(&bytes).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let tree = Tree {
            entries: vec![entry("100644", "a", 1), entry("100644", "a", 2)],
        };
        assert!(tree.validate().is_err());
    }
}
