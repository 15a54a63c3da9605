use std::fmt::Display;
use std::str::FromStr;

use bstr::ByteSlice;

use crate::error::{Error, Result};
use crate::object::{Object, ObjectKind};
use crate::timestamp::Timestamp;

/// The `Name <email>` part of a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn sign(&self, when: Timestamp) -> Signature {
        Signature::new(self.name.clone(), self.email.clone(), when)
    }
}

/// Who made a change, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: Timestamp,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>, when: Timestamp) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
        }
    }

    /// Parse `Name <email> 1658312219 +0100`.
    fn parse(line: &str) -> Result<Self> {
        let bad = || Error::MalformedCommit(format!("invalid signature '{line}'"));

        let (identity, when) = line.split_once("> ").ok_or_else(bad)?;
        let (name, email) = identity.split_once(" <").ok_or_else(bad)?;

        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
            when: Timestamp::from_str(when)?,
        })
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.when)
    }
}

/// Characters that would let a name or email break out of its signature line.
const IDENTITY_FORBIDDEN: [char; 4] = ['\n', '\r', '<', '>'];

fn check_identity(field: &str, value: &str) -> Result<()> {
    if value.contains(IDENTITY_FORBIDDEN) {
        return Err(Error::InvalidIdentity(format!(
            "{field} may not contain newlines, '<' or '>': {value:?}"
        )));
    }
    Ok(())
}

/// A commit without parents.
///
/// The tree id is carried as given: building trees is somebody else's job. It only has to fit
/// on its header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    tree_id: String,
    author: Signature,
    committer: Signature,
    message: String,
}

impl Commit {
    pub fn new(
        tree_id: impl Into<String>,
        author: Signature,
        committer: Signature,
        message: impl Into<String>,
    ) -> Result<Self> {
        let tree_id = tree_id.into();
        if tree_id.contains(['\n', '\r']) {
            return Err(Error::MalformedCommit(format!(
                "tree id may not contain newlines: {tree_id:?}"
            )));
        }
        for signature in [&author, &committer] {
            check_identity("name", &signature.name)?;
            check_identity("email", &signature.email)?;
        }

        Ok(Self {
            tree_id,
            author,
            committer,
            message: message.into(),
        })
    }

    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    pub fn author(&self) -> &Signature {
        &self.author
    }

    pub fn committer(&self) -> &Signature {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The commit as stored, without the object header.
    pub fn payload(&self) -> Vec<u8> {
        format!(
            "\
            tree {}\n\
            author {}\n\
            committer {}\n\
            \n\
            {}\n",
            self.tree_id, self.author, self.committer, self.message
        )
        .into_bytes()
    }

    pub fn to_object(&self) -> Object {
        Object::new(ObjectKind::Commit, self.payload())
    }

    /// Parse a commit payload.
    ///
    /// ## Example
    /// ```text
    /// tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904
    /// author Your Name <you@example.com> 1658312219 +0100
    /// committer Your Name <you@example.com> 1658312219 +0100
    ///
    /// first
    /// ```
    ///
    /// Unknown header lines (`parent`, `gpgsig`, ...) are skipped.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = bytes
            .to_str()
            .map_err(|_| Error::MalformedCommit("commit is not valid UTF-8".into()))?;

        let (headers, message) = text
            .split_once("\n\n")
            .ok_or_else(|| Error::MalformedCommit("no blank line before the message".into()))?;

        let mut tree_id = None;
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            if let Some(rest) = line.strip_prefix("tree ") {
                tree_id = Some(rest.to_owned());
            } else if let Some(rest) = line.strip_prefix("author ") {
                author = Some(Signature::parse(rest)?);
            } else if let Some(rest) = line.strip_prefix("committer ") {
                committer = Some(Signature::parse(rest)?);
            }
        }

        let missing = |what: &str| Error::MalformedCommit(format!("missing {what} line"));

        Ok(Self {
            tree_id: tree_id.ok_or_else(|| missing("tree"))?,
            author: author.ok_or_else(|| missing("author"))?,
            committer: committer.ok_or_else(|| missing("committer"))?,
            message: message.strip_suffix('\n').unwrap_or(message).to_owned(),
        })
    }
}
