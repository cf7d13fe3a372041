//! The four object kinds (§3), their canonical serialization, and the
//! content-addressed store that persists them (§4.2).

pub mod blob;
pub mod commit;
pub mod kvlm;
pub mod store;
pub mod tag;
pub mod tree;

pub use blob::Blob;
pub use commit::{Commit, Signature};
pub use store::ObjectStore;
pub use tag::Tag;
pub use tree::{Tree, TreeEntry};

use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
        }
    }

    pub fn from_str(s: &str) -> Result<ObjectKind> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            "tag" => Ok(ObjectKind::Tag),
            other => Err(Error::MalformedObject("header".into(), format!("unknown type {other}"))),
        }
    }
}

/// A typed, in-memory object. Dispatch at read time is driven by the
/// framed header's type tag, never by field presence (§9 sharp edge (b)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitObject {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl GitObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            GitObject::Blob(_) => ObjectKind::Blob,
            GitObject::Tree(_) => ObjectKind::Tree,
            GitObject::Commit(_) => ObjectKind::Commit,
            GitObject::Tag(_) => ObjectKind::Tag,
        }
    }

    pub fn serialize_payload(&self) -> Vec<u8> {
        match self {
            GitObject::Blob(blob) => blob.serialize(),
            GitObject::Tree(tree) => tree.serialize(),
            GitObject::Commit(commit) => commit.serialize(),
            GitObject::Tag(tag) => tag.serialize(),
        }
    }

    pub fn deserialize(kind: ObjectKind, payload: Vec<u8>) -> Result<GitObject> {
        Ok(match kind {
            ObjectKind::Blob => GitObject::Blob(Blob::deserialize(payload)),
            ObjectKind::Tree => GitObject::Tree(Tree::deserialize(&payload)?),
            ObjectKind::Commit => GitObject::Commit(Commit::deserialize(&payload)?),
            ObjectKind::Tag => GitObject::Tag(Tag::deserialize(&payload)?),
        })
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            GitObject::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            GitObject::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            GitObject::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            GitObject::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

/// Frame a payload with its type/size header: `"{type} {size}\0{payload}"`.
pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut framed = format!("{} {}\0", kind.as_str(), payload.len()).into_bytes();
    framed.extend_from_slice(payload);
    framed
}

/// Compute the 40-char lowercase hex SHA-1 identity of an object's framed
/// bytes, without touching the filesystem.
pub fn hash_payload(kind: ObjectKind, payload: &[u8]) -> String {
    let framed = frame(kind, payload);
    let digest = Sha1::digest(&framed);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_hashes_to_the_well_known_git_identity() {
        // S1: hashing an empty byte sequence as `blob`.
        assert_eq!(
            hash_payload(ObjectKind::Blob, b""),
            "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
        );
    }

    #[test]
    fn hello_blob_matches_s2_scenario() {
        assert_eq!(
            hash_payload(ObjectKind::Blob, b"hello\n"),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }
}
