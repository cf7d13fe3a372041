use crate::error::{Error, Result};
use crate::objects::commit::Signature;
use crate::objects::kvlm::Kvlm;
use crate::objects::ObjectKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub object: String,
    pub object_type: ObjectKind,
    pub tag: String,
    pub tagger: Signature,
    pub message: Vec<u8>,
}

impl Tag {
    pub fn serialize(&self) -> Vec<u8> {
        let mut kvlm = Kvlm::new(self.message.clone());
        kvlm.add("object", self.object.clone());
        kvlm.add("type", self.object_type.as_str());
        kvlm.add("tag", self.tag.clone());
        kvlm.add("tagger", self.tagger.format());
        kvlm.serialize()
    }

    pub fn deserialize(payload: &[u8]) -> Result<Tag> {
        let kvlm = Kvlm::parse(payload)?;
        let object = std::str::from_utf8(
            kvlm.get_one(b"object")
                .ok_or_else(|| Error::MalformedObject("tag".into(), "missing object".into()))?,
        )
        .map_err(|_| Error::MalformedObject("tag".into(), "object is not UTF-8".into()))?
        .to_string();
        let object_type = ObjectKind::from_str(
            std::str::from_utf8(
                kvlm.get_one(b"type")
                    .ok_or_else(|| Error::MalformedObject("tag".into(), "missing type".into()))?,
            )
            .map_err(|_| Error::MalformedObject("tag".into(), "type is not UTF-8".into()))?,
        )?;
        let tag = std::str::from_utf8(
            kvlm.get_one(b"tag")
                .ok_or_else(|| Error::MalformedObject("tag".into(), "missing tag".into()))?,
        )
        .map_err(|_| Error::MalformedObject("tag".into(), "tag is not UTF-8".into()))?
        .to_string();
        let tagger = Signature::parse(
            kvlm.get_one(b"tagger")
                .ok_or_else(|| Error::MalformedObject("tag".into(), "missing tagger".into()))?,
        )?;
        Ok(Tag {
            object,
            object_type,
            tag,
            tagger,
            message: kvlm.message().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips_through_kvlm() {
        let tag = Tag {
            object: "a".repeat(40),
            object_type: ObjectKind::Commit,
            tag: "v1.0".into(),
            tagger: Signature::new("A U Thor", "a@u", 0, "+0000"),
            message: b"release\n".to_vec(),
        };
        let bytes = tag.serialize();
        let parsed = Tag::deserialize(&bytes).unwrap();
        assert_eq!(parsed, tag);
    }
}
