use std::fs;
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::error::{Error, Result};
use crate::repository::atomic_write;

const SIGNATURE: &[u8; 4] = b"DIRC";
const SUPPORTED_VERSION: u32 = 2;
/// The fixed portion of an on-disk entry before its NUL-terminated name:
/// 4×(ctime_s, ctime_n, mtime_s, mtime_n, dev, ino, mode, uid, gid, size)
/// minus the four timestamp fields already counted... i.e. 10 u32 fields
/// (40 bytes) + 20-byte hash + 2-byte flags.
const ENTRY_FIXED_LEN: usize = 62;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Regular,
    Symlink,
    Gitlink,
}

impl EntryType {
    fn bits(self) -> u32 {
        match self {
            EntryType::Regular => 0b1000,
            EntryType::Symlink => 0b1010,
            EntryType::Gitlink => 0b1110,
        }
    }

    fn from_bits(bits: u32) -> Result<EntryType> {
        match bits {
            0b1000 => Ok(EntryType::Regular),
            0b1010 => Ok(EntryType::Symlink),
            0b1110 => Ok(EntryType::Gitlink),
            other => Err(Error::MalformedIndex(format!("unknown entry type bits {other:#b}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub ctime_s: u32,
    pub ctime_n: u32,
    pub mtime_s: u32,
    pub mtime_n: u32,
    pub dev: u32,
    pub ino: u32,
    pub entry_type: EntryType,
    /// 9-bit permission bits: 0o644/0o755 for regular files, 0 otherwise.
    pub perm: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    pub hash: [u8; 20],
    pub assume_valid: bool,
    pub stage: u8,
    pub name: String,
}

impl IndexEntry {
    pub fn mode(&self) -> u32 {
        (self.entry_type.bits() << 12) | (self.perm & 0o777)
    }

    fn raw_len(&self) -> usize {
        ENTRY_FIXED_LEN + self.name.len()
    }

    /// Total serialized length, padded to a multiple of 8 with 1–8 NUL
    /// bytes (§9 sharp edge (a): exactly 8, never 0, when already aligned).
    fn padded_len(&self) -> usize {
        let raw = self.raw_len();
        let remainder = raw % 8;
        let nul_count = 8 - remainder;
        raw + nul_count
    }

    fn write_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.ctime_s.to_be_bytes());
        buf.extend_from_slice(&self.ctime_n.to_be_bytes());
        buf.extend_from_slice(&self.mtime_s.to_be_bytes());
        buf.extend_from_slice(&self.mtime_n.to_be_bytes());
        buf.extend_from_slice(&self.dev.to_be_bytes());
        buf.extend_from_slice(&self.ino.to_be_bytes());
        buf.extend_from_slice(&self.mode().to_be_bytes());
        buf.extend_from_slice(&self.uid.to_be_bytes());
        buf.extend_from_slice(&self.gid.to_be_bytes());
        buf.extend_from_slice(&self.size.to_be_bytes());
        buf.extend_from_slice(&self.hash);

        let name_len = self.name.len().min(0xFFF) as u16;
        let mut flags: u16 = name_len;
        flags |= (self.stage as u16 & 0b11) << 12;
        if self.assume_valid {
            flags |= 0x8000;
        }
        buf.extend_from_slice(&flags.to_be_bytes());

        buf.extend_from_slice(self.name.as_bytes());
        let nul_count = self.padded_len() - self.raw_len();
        buf.extend(std::iter::repeat(0u8).take(nul_count));
    }

    fn parse(data: &[u8]) -> Result<(IndexEntry, usize)> {
        if data.len() < ENTRY_FIXED_LEN {
            return Err(Error::MalformedIndex("truncated entry".into()));
        }
        let mut cursor = 0usize;
        let mut next_u32 = |buf: &[u8], cursor: &mut usize| -> u32 {
            let v = u32::from_be_bytes(buf[*cursor..*cursor + 4].try_into().unwrap());
            *cursor += 4;
            v
        };

        let ctime_s = next_u32(data, &mut cursor);
        let ctime_n = next_u32(data, &mut cursor);
        let mtime_s = next_u32(data, &mut cursor);
        let mtime_n = next_u32(data, &mut cursor);
        let dev = next_u32(data, &mut cursor);
        let ino = next_u32(data, &mut cursor);
        let mode = next_u32(data, &mut cursor);
        let uid = next_u32(data, &mut cursor);
        let gid = next_u32(data, &mut cursor);
        let size = next_u32(data, &mut cursor);

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&data[cursor..cursor + 20]);
        cursor += 20;

        let flags = u16::from_be_bytes(data[cursor..cursor + 2].try_into().unwrap());
        cursor += 2;

        let extended = (flags & 0x4000) != 0;
        if extended {
            return Err(Error::MalformedIndex("extended flag (v3+) is not supported".into()));
        }
        let assume_valid = (flags & 0x8000) != 0;
        let stage = ((flags >> 12) & 0b11) as u8;

        // The 12-bit name-length field is advisory (0xFFF means "at least
        // 0xFFF"); every entry's name is always NUL-terminated regardless,
        // so the terminator is what actually bounds the name.
        let name_start = cursor;
        let nul_rel = data[name_start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::MalformedIndex("name missing NUL terminator".into()))?;

        let name = std::str::from_utf8(&data[name_start..name_start + nul_rel])
            .map_err(|_| Error::MalformedIndex("entry name is not UTF-8".into()))?
            .to_string();

        let entry_type = EntryType::from_bits((mode >> 12) & 0b1111)?;
        let perm = mode & 0o777;

        let entry = IndexEntry {
            ctime_s,
            ctime_n,
            mtime_s,
            mtime_n,
            dev,
            ino,
            entry_type,
            perm,
            uid,
            gid,
            size,
            hash,
            assume_valid,
            stage,
            name,
        };

        let consumed = entry.padded_len();
        Ok((entry, consumed))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Index {
    pub entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Index { entries: Vec::new() }
    }

    pub fn read(path: &Path) -> Result<Index> {
        if !path.exists() {
            return Ok(Index::new());
        }
        let data = fs::read(path)?;
        if data.len() < 12 + 20 {
            return Err(Error::MalformedIndex("file too short".into()));
        }

        let (body, trailer) = data.split_at(data.len() - 20);
        let computed = Sha1::digest(body);
        if computed.as_slice() != trailer {
            return Err(Error::MalformedIndex("trailer checksum mismatch".into()));
        }

        if &body[0..4] != SIGNATURE {
            return Err(Error::MalformedIndex("bad magic".into()));
        }
        let version = u32::from_be_bytes(body[4..8].try_into().unwrap());
        if version != SUPPORTED_VERSION {
            return Err(Error::MalformedIndex(format!(
                "unsupported index version {version}"
            )));
        }
        let count = u32::from_be_bytes(body[8..12].try_into().unwrap());

        let mut entries = Vec::with_capacity(count as usize);
        let mut cursor = 12usize;
        for _ in 0..count {
            let (entry, consumed) = IndexEntry::parse(&body[cursor..])?;
            cursor += consumed;
            entries.push(entry);
        }

        for pair in entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if (a.name.clone(), a.stage) > (b.name.clone(), b.stage) {
                return Err(Error::MalformedIndex("entries are not in sorted order".into()));
            }
        }

        Ok(Index { entries })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        buf.extend_from_slice(SIGNATURE);
        buf.extend_from_slice(&SUPPORTED_VERSION.to_be_bytes());
        buf.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());

        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| (a.name.clone(), a.stage).cmp(&(b.name.clone(), b.stage)));
        for entry in &sorted {
            entry.write_into(&mut buf);
        }

        let trailer = Sha1::digest(&buf);
        buf.extend_from_slice(&trailer);

        atomic_write(path, &buf)
    }

    /// Replace (or insert) the entry for `name`, keeping the list sorted.
    pub fn upsert(&mut self, entry: IndexEntry) {
        self.entries.retain(|e| e.name != entry.name || e.stage != entry.stage);
        self.entries.push(entry);
        self.entries
            .sort_by(|a, b| (a.name.clone(), a.stage).cmp(&(b.name.clone(), b.stage)));
    }

    /// Remove every entry for `name` (all stages). Returns whether anything
    /// was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    pub fn find(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.name == name && e.stage == 0)
    }
}

/// Validate an index-entry path per §4.5: relative, forward slashes,
/// non-empty, no leading `/`, no NUL, no `..` traversal out of the worktree.
pub fn validate_path(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidPath(name.to_string(), "empty path".into()));
    }
    if name.starts_with('/') {
        return Err(Error::InvalidPath(name.to_string(), "absolute path".into()));
    }
    if name.contains('\0') {
        return Err(Error::InvalidPath(name.to_string(), "contains NUL".into()));
    }
    if name.split('/').any(|segment| segment == "..") {
        return Err(Error::InvalidPath(name.to_string(), "escapes worktree via ..".into()));
    }
    Ok(())
}
