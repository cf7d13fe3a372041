use std::path::PathBuf;

use thiserror::Error;

/// Every failure mode the core can produce, one variant per §7 error kind.
/// Kinds never alias: a caller can match on the variant instead of parsing
/// a message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not a vesigit repository (or any of the parent directories): {0}")]
    NotARepository(PathBuf),

    #[error("unsupported repository format version {0}")]
    UnsupportedFormat(u32),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("ambiguous object prefix {prefix}: {} candidates", candidates.len())]
    AmbiguousObject {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("malformed object {0}: {1}")]
    MalformedObject(String, String),

    #[error("malformed index: {0}")]
    MalformedIndex(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("invalid path {0:?}: {1}")]
    InvalidPath(String, String),

    #[error("missing identity: configure user.name and user.email")]
    MissingIdentity,

    #[error("reference cycle or depth exceeded resolving {0}")]
    ReferenceCycle(String),

    #[error("destination is not empty: {0}")]
    DestinationNotEmpty(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
