//! The key/value-with-message envelope used by commit and annotated-tag
//! payloads (§4.4). An ordered map from key to one-or-more values, plus a
//! free-form message tail.

use crate::error::{Error, Result};

/// An ordered key/value/message structure. Duplicate keys collapse into an
/// ordered list of values (first occurrence first); the message is
/// everything after the header's blank-line separator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Kvlm {
    entries: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
    message: Vec<u8>,
}

impl Kvlm {
    pub fn new(message: impl Into<Vec<u8>>) -> Self {
        Kvlm {
            entries: Vec::new(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// All values for `key`, in insertion order, or `None` if absent.
    pub fn get(&self, key: &[u8]) -> Option<&[Vec<u8>]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// The single value for `key`. Errors (via the caller, not here) are the
    /// caller's business; this returns the first value if more than one is
    /// present.
    pub fn get_one(&self, key: &[u8]) -> Option<&[u8]> {
        self.get(key).and_then(|values| values.first()).map(|v| v.as_slice())
    }

    /// Append a value for `key`, creating the key's entry if it doesn't
    /// exist yet. Preserves first-occurrence order for the key itself.
    pub fn add(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == &key) {
            entry.1.push(value);
        } else {
            self.entries.push((key, vec![value]));
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|(k, _)| k.as_slice())
    }

    /// Parse a raw KVLM buffer. The header ends at the first LF immediately
    /// followed by another LF (blank separator) or end-of-input.
    pub fn parse(data: &[u8]) -> Result<Kvlm> {
        let mut entries: Vec<(Vec<u8>, Vec<Vec<u8>>)> = Vec::new();
        let mut pos = 0usize;

        loop {
            if pos >= data.len() {
                return Ok(Kvlm {
                    entries,
                    message: Vec::new(),
                });
            }

            let rest = &data[pos..];
            let nl_offset = rest.iter().position(|&b| b == b'\n').ok_or_else(|| {
                Error::MalformedObject(
                    "kvlm".into(),
                    "header line missing terminating LF".into(),
                )
            })?;

            if nl_offset == 0 {
                let message = data[pos + 1..].to_vec();
                return Ok(Kvlm { entries, message });
            }

            let line = &rest[..nl_offset];
            if line[0] == b' ' {
                let continuation = &line[1..];
                let last_value = entries
                    .last_mut()
                    .and_then(|(_, values)| values.last_mut())
                    .ok_or_else(|| {
                        Error::MalformedObject(
                            "kvlm".into(),
                            "continuation line with no preceding key".into(),
                        )
                    })?;
                last_value.push(b'\n');
                last_value.extend_from_slice(continuation);
            } else {
                let space = line.iter().position(|&b| b == b' ').ok_or_else(|| {
                    Error::MalformedObject(
                        "kvlm".into(),
                        "header line missing key/value separator".into(),
                    )
                })?;
                let key = line[..space].to_vec();
                let value = line[space + 1..].to_vec();
                if let Some(entry) = entries.iter_mut().find(|(k, _)| k == &key) {
                    entry.1.push(value);
                } else {
                    entries.push((key, vec![value]));
                }
            }

            pos += nl_offset + 1;
        }
    }

    /// Serialize back to the exact byte form a matching `parse` would
    /// consume: `serialize(parse(x)) == x` for well-formed `x`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, values) in &self.entries {
            for value in values {
                out.extend_from_slice(key);
                out.push(b' ');
                for &byte in value {
                    out.push(byte);
                    if byte == b'\n' {
                        out.push(b' ');
                    }
                }
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMIT_FIXTURE: &[u8] = b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\nparent 206941306e8a8af65b66eaaaea388a7ae24d49a0\nauthor Thibault Polge <thibault@thb.lt> 1527025023 +0200\ncommitter Thibault Polge <thibault@thb.lt> 1527025044 +0200\ngpgsig -----BEGIN PGP SIGNATURE-----\n \n iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n kGQdcBAAqPP+ln4nGDd2gETXjvOpOxLzIMEw4A9gBmygEOsFHCBmksxK9rTFtwbg\n -----END PGP SIGNATURE-----\n\nCreate first draft\n";

    #[test]
    fn parses_header_and_message() {
        let kvlm = Kvlm::parse(COMMIT_FIXTURE).unwrap();
        assert_eq!(
            kvlm.get_one(b"tree").unwrap(),
            b"29ff16c9c14e2652b22f8b78bb08a5a07930c147"
        );
        assert_eq!(kvlm.message(), b"Create first draft\n");
        assert!(kvlm.get(b"gpgsig").unwrap()[0].contains(&b'\n'));
    }

    #[test]
    fn round_trips_exactly() {
        let kvlm = Kvlm::parse(COMMIT_FIXTURE).unwrap();
        assert_eq!(kvlm.serialize(), COMMIT_FIXTURE);
    }

    #[test]
    fn duplicate_keys_collapse_into_list() {
        let data = b"tree aaaa\nparent bbbb\nparent cccc\nauthor x\ncommitter x\n\nmsg\n";
        let kvlm = Kvlm::parse(data).unwrap();
        assert_eq!(kvlm.get(b"parent").unwrap(), &[b"bbbb".to_vec(), b"cccc".to_vec()]);
        assert_eq!(kvlm.serialize(), data);
    }

    #[test]
    fn header_with_no_trailing_blank_line_has_empty_message() {
        let data = b"tree aaaa\n";
        let kvlm = Kvlm::parse(data).unwrap();
        assert_eq!(kvlm.get_one(b"tree").unwrap(), b"aaaa");
        assert_eq!(kvlm.message(), b"");
    }

    #[test]
    fn constructing_and_serializing_matches_hand_rolled_bytes() {
        let mut kvlm = Kvlm::new(*b"hello\n");
        kvlm.add("tree", "aaaa");
        kvlm.add("parent", "bbbb");
        kvlm.add("parent", "cccc");
        assert_eq!(
            kvlm.serialize(),
            b"tree aaaa\nparent bbbb\nparent cccc\n\nhello\n".to_vec()
        );
    }
}
