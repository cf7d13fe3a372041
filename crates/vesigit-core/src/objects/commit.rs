use crate::error::{Error, Result};
use crate::objects::kvlm::Kvlm;

/// An author/committer/tagger identity line: `"{name} <{email}> {seconds} {tz}"`.
/// `tz` is always emitted bit-exact, e.g. `+0200` or `-0530`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub timestamp: i64,
    pub tz_offset: String,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>, timestamp: i64, tz_offset: impl Into<String>) -> Self {
        Signature {
            name: name.into(),
            email: email.into(),
            timestamp,
            tz_offset: tz_offset.into(),
        }
    }

    pub fn format(&self) -> String {
        format!("{} <{}> {} {}", self.name, self.email, self.timestamp, self.tz_offset)
    }

    pub fn parse(raw: &[u8]) -> Result<Signature> {
        let raw = std::str::from_utf8(raw)
            .map_err(|_| Error::MalformedObject("commit".into(), "identity is not UTF-8".into()))?;
        let lt = raw
            .find('<')
            .ok_or_else(|| Error::MalformedObject("commit".into(), "identity missing '<'".into()))?;
        let gt = raw
            .find('>')
            .ok_or_else(|| Error::MalformedObject("commit".into(), "identity missing '>'".into()))?;
        let name = raw[..lt].trim().to_string();
        let email = raw[lt + 1..gt].to_string();
        let rest = raw[gt + 1..].trim();
        let mut parts = rest.splitn(2, ' ');
        let timestamp: i64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::MalformedObject("commit".into(), "missing timestamp".into()))?;
        let tz_offset = parts
            .next()
            .ok_or_else(|| Error::MalformedObject("commit".into(), "missing timezone".into()))?
            .to_string();
        Ok(Signature {
            name,
            email,
            timestamp,
            tz_offset,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: String,
    pub parents: Vec<String>,
    pub author: Signature,
    pub committer: Signature,
    pub message: Vec<u8>,
}

impl Commit {
    pub fn serialize(&self) -> Vec<u8> {
        let mut kvlm = Kvlm::new(self.message.clone());
        kvlm.add("tree", self.tree.clone());
        for parent in &self.parents {
            kvlm.add("parent", parent.clone());
        }
        kvlm.add("author", self.author.format());
        kvlm.add("committer", self.committer.format());
        kvlm.serialize()
    }

    pub fn deserialize(payload: &[u8]) -> Result<Commit> {
        let kvlm = Kvlm::parse(payload)?;
        let tree = kvlm
            .get_one(b"tree")
            .ok_or_else(|| Error::MalformedObject("commit".into(), "missing tree".into()))?;
        let tree = std::str::from_utf8(tree)
            .map_err(|_| Error::MalformedObject("commit".into(), "tree is not UTF-8".into()))?
            .to_string();
        let parents = kvlm
            .get(b"parent")
            .unwrap_or(&[])
            .iter()
            .map(|p| {
                std::str::from_utf8(p)
                    .map(str::to_string)
                    .map_err(|_| Error::MalformedObject("commit".into(), "parent is not UTF-8".into()))
            })
            .collect::<Result<Vec<_>>>()?;
        let author = Signature::parse(
            kvlm.get_one(b"author")
                .ok_or_else(|| Error::MalformedObject("commit".into(), "missing author".into()))?,
        )?;
        let committer = Signature::parse(
            kvlm.get_one(b"committer")
                .ok_or_else(|| Error::MalformedObject("commit".into(), "missing committer".into()))?,
        )?;
        Ok(Commit {
            tree,
            parents,
            author,
            committer,
            message: kvlm.message().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips() {
        let sig = Signature::new("A U Thor", "a@u", 0, "+0000");
        assert_eq!(sig.format(), "A U Thor <a@u> 0 +0000");
        let parsed = Signature::parse(sig.format().as_bytes()).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn commit_round_trips_through_kvlm() {
        let commit = Commit {
            tree: "4b825dc642cb6eb9a060e54bf8d69288fbee4904".into(),
            parents: vec!["0".repeat(40)],
            author: Signature::new("A U Thor", "a@u", 0, "+0000"),
            committer: Signature::new("A U Thor", "a@u", 0, "+0000"),
            message: b"first\n".to_vec(),
        };
        let bytes = commit.serialize();
        let parsed = Commit::deserialize(&bytes).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn initial_commit_matches_s2_scenario_bytes() {
        let commit = Commit {
            tree: "fake".into(),
            parents: vec![],
            author: Signature::new("A U Thor", "a@u", 0, "+0000"),
            committer: Signature::new("A U Thor", "a@u", 0, "+0000"),
            message: b"first\n".to_vec(),
        };
        let bytes = commit.serialize();
        assert_eq!(
            bytes,
            b"tree fake\nauthor A U Thor <a@u> 0 +0000\ncommitter A U Thor <a@u> 0 +0000\n\nfirst\n".to_vec()
        );
    }
}
