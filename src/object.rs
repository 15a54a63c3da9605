use std::fmt::Display;
use std::str::FromStr;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Commit,
    Tree,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Commit => "commit",
            Self::Tree => "tree",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "commit" => Ok(Self::Commit),
            "tree" => Ok(Self::Tree),
            _ => Err(Error::UnknownKind(s.to_owned())),
        }
    }
}

/// A typed payload, as stored in the database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    kind: ObjectKind,
    payload: Vec<u8>,
}

impl Object {
    pub fn new(kind: ObjectKind, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

}

/// Returns the payload formatted `"{type} {len}\0{data}"`.
/// e.g.
/// a blob `"hello\n"` becomes `"blob 6\0hello\n"`
pub fn encode(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let len = payload.len().to_string();
    let mut formatted = Vec::with_capacity(kind.as_str().len() + len.len() + 2 + payload.len());
    formatted.extend_from_slice(kind.as_str().as_bytes());
    formatted.push(b' ');
    formatted.extend_from_slice(len.as_bytes());
    formatted.push(b'\0');
    formatted.extend_from_slice(payload);
    formatted
}
