use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, Result};
use crate::objects::{frame, GitObject, ObjectKind};
use crate::repository::atomic_write;

/// The sharded, zlib-compressed, content-addressed object store (§4.2):
/// every distinct `(kind, payload)` lives at exactly one path, named after
/// the SHA-1 of its framed bytes.
pub struct ObjectStore {
    objects_dir: PathBuf,
}

impl ObjectStore {
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        ObjectStore {
            objects_dir: objects_dir.into(),
        }
    }

    fn shard_path(&self, id: &str) -> PathBuf {
        self.objects_dir.join(&id[..2]).join(&id[2..])
    }

    /// Serialize, hash, compress, and write an object if it is not already
    /// present. Returns the identity either way (hash stability, §8 test 5).
    pub fn write(&self, object: &GitObject) -> Result<String> {
        let payload = object.serialize_payload();
        let framed = frame(object.kind(), &payload);
        let id = {
            use sha1::{Digest, Sha1};
            hex::encode(Sha1::digest(&framed))
        };

        let path = self.shard_path(&id);
        if path.exists() {
            return Ok(id);
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        std::io::Write::write_all(&mut encoder, &framed)?;
        let compressed = encoder.finish()?;
        atomic_write(&path, &compressed)?;
        Ok(id)
    }

    /// Hash an object's framed bytes without touching the filesystem.
    pub fn hash(&self, object: &GitObject) -> String {
        let payload = object.serialize_payload();
        crate::objects::hash_payload(object.kind(), &payload)
    }

    /// Read and decompress the object named by the full 40-hex `id`.
    pub fn read(&self, id: &str) -> Result<GitObject> {
        let path = self.shard_path(id);
        let file = fs::File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ObjectNotFound(id.to_string())
            } else {
                Error::Io(e)
            }
        })?;

        let mut decoder = ZlibDecoder::new(file);
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|_| Error::MalformedObject(id.to_string(), "zlib decompression failed".into()))?;

        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::MalformedObject(id.to_string(), "missing header terminator".into()))?;
        let header = std::str::from_utf8(&raw[..nul])
            .map_err(|_| Error::MalformedObject(id.to_string(), "header is not UTF-8".into()))?;
        let (kind_str, size_str) = header
            .split_once(' ')
            .ok_or_else(|| Error::MalformedObject(id.to_string(), "header missing separator".into()))?;
        let kind = ObjectKind::from_str(kind_str)?;
        let size: usize = size_str
            .parse()
            .map_err(|_| Error::MalformedObject(id.to_string(), "size is not a number".into()))?;

        let payload = raw[nul + 1..].to_vec();
        if payload.len() != size {
            return Err(Error::MalformedObject(
                id.to_string(),
                format!("size mismatch: header says {size}, found {}", payload.len()),
            ));
        }

        GitObject::deserialize(kind, payload)
    }

    /// Enumerate every on-disk object whose id starts with `prefix`
    /// (4–40 lowercase hex chars). Used by the name resolver (§4.6).
    pub fn ids_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        if prefix.len() < 2 {
            return Ok(Vec::new());
        }
        let shard_dir = self.objects_dir.join(&prefix[..2]);
        if !shard_dir.is_dir() {
            return Ok(Vec::new());
        }
        let rest = &prefix[2..];
        let mut matches = Vec::new();
        for entry in fs::read_dir(&shard_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(rest) {
                matches.push(format!("{}{}", &prefix[..2], name));
            }
        }
        matches.sort();
        Ok(matches)
    }

    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Blob;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips_an_empty_blob() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let object = GitObject::Blob(Blob::new(Vec::new()));
        let id = store.write(&object).unwrap();
        assert_eq!(id, "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");

        let read = store.read(&id).unwrap();
        assert_eq!(read.as_blob().unwrap().data, Vec::<u8>::new());
    }

    #[test]
    fn writing_the_same_content_twice_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let object = GitObject::Blob(Blob::new(b"hello\n".to_vec()));

        let id1 = store.write(&object).unwrap();
        let path = store.shard_path(&id1);
        let metadata1 = fs::metadata(&path).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let id2 = store.write(&object).unwrap();
        let metadata2 = fs::metadata(&path).unwrap();

        assert_eq!(id1, id2);
        assert_eq!(metadata1.modified().unwrap(), metadata2.modified().unwrap());
    }

    #[test]
    fn read_missing_object_reports_object_not_found() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let err = store.read(&"a".repeat(40)).unwrap_err();
        assert!(matches!(err, Error::ObjectNotFound(_)));
    }

    #[test]
    fn prefix_lookup_finds_matching_ids() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let id = store.write(&GitObject::Blob(Blob::new(b"x".to_vec()))).unwrap();

        let matches = store.ids_with_prefix(&id[..6]).unwrap();
        assert_eq!(matches, vec![id]);
    }
}
