/// A blob's payload is opaque file content; serialization is the identity
/// function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Blob { data }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn deserialize(payload: Vec<u8>) -> Blob {
        Blob { data: payload }
    }
}
