//! Maps a user-facing token — `HEAD`, a (possibly abbreviated) hash, a
//! branch, or a tag — to every object hash it could plausibly mean (§4.6).
//! Uniqueness is the caller's concern: `Error::AmbiguousObject` is raised
//! one layer up, by whoever actually needs a single answer.

use crate::error::{Error, Result};
use crate::objects::{GitObject, ObjectKind, ObjectStore};
use crate::refs::RefStore;

fn looks_like_hash_prefix(token: &str) -> bool {
    (4..=40).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// All object hashes `token` could refer to.
pub fn resolve(store: &ObjectStore, refs: &RefStore, token: &str) -> Result<Vec<String>> {
    if token.is_empty() {
        return Ok(Vec::new());
    }

    if token == "HEAD" {
        return Ok(refs.resolve("HEAD")?.into_iter().collect());
    }

    if looks_like_hash_prefix(token) {
        let lowered = token.to_ascii_lowercase();
        if lowered.len() == 40 {
            // A full hash is its own candidate; confirm it names an object.
            return Ok(store.ids_with_prefix(&lowered)?);
        }
        return Ok(store.ids_with_prefix(&lowered)?);
    }

    let mut candidates = Vec::new();
    for namespace in ["refs/tags", "refs/heads", "refs/remotes"] {
        if let Some(hash) = refs.resolve(&format!("{namespace}/{token}"))? {
            candidates.push(hash);
        }
    }
    Ok(candidates)
}

/// Resolve `token` to exactly one hash, or an ambiguous/not-found error.
pub fn resolve_unique(store: &ObjectStore, refs: &RefStore, token: &str) -> Result<String> {
    let mut candidates = resolve(store, refs, token)?;
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(Error::ObjectNotFound(token.to_string())),
        _ => Err(Error::AmbiguousObject {
            prefix: token.to_string(),
            candidates,
        }),
    }
}

/// Follow a resolved hash down to an object of `expected` kind: a tag
/// follows its `object` field, a commit follows its `tree` field when the
/// caller wants a tree. Any other mismatch at termination is an error.
pub fn follow_to_kind(store: &ObjectStore, hash: &str, expected: ObjectKind) -> Result<String> {
    let mut current = hash.to_string();
    loop {
        let object = store.read(&current)?;
        if object.kind() == expected {
            return Ok(current);
        }
        match object {
            GitObject::Tag(tag) => {
                current = tag.object;
            }
            GitObject::Commit(commit) if expected == ObjectKind::Tree => {
                current = commit.tree;
            }
            other => {
                return Err(Error::TypeMismatch {
                    expected: expected.as_str().to_string(),
                    found: other.kind().as_str().to_string(),
                });
            }
        }
    }
}
