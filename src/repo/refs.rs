use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;

use crate::digest::Digest;
use crate::error::{Error, IoContext, Result};
use crate::lock::LockedFile;

/// Contains all characters that cannot appear in a ref name.
///
/// In git, the character `'*'` is allowed in ref names if the environment variable
/// `REFNAME_REFSPEC_PATTERN` is set. We do not allow this, so `'*'` appears in this array.
///
/// See: <https://github.com/git/git/blob/795ea8776befc95ea2becd8020c7a284677b4161/refs.c#L48-L57>
const DISALLOWED_CHARACTERS: [char; 40] = [
    '\x01', '\x02', '\x03', '\x04', '\x05', '\x06', '\x07', '\x08', '\t', '\n', '\x0b', '\x0c',
    '\r', '\x0e', '\x0f', '\x10', '\x11', '\x12', '\x13', '\x14', '\x15', '\x16', '\x17', '\x18',
    '\x19', '\x1a', '\x1b', '\x1c', '\x1d', '\x1e', '\x1f', ' ', '*', ':', '?', '[', '\\', '^',
    '~', '\x7f',
];

const SYMREF_PREFIX: &str = "ref: ";
const HEADS_PREFIX: &str = "refs/heads/";

/// Check whether a string is a valid branch name.
///
/// Disallowed names are any where:
///
/// - it is empty, or contains NUL
/// - it (or any path component) begins with `'.'`
/// - it contains double dots `".."`
/// - it contains ASCII control characters
/// - it contains ':', '?', '[', '\', '^', '~', SP, or TAB anywhere
/// - it contains `'*'`
/// - it begins or ends with `'/'`, or contains `"//"`
/// - any path component ends with `".lock"`
/// - it contains `"@{"`
///
/// See: <https://github.com/git/git/blob/795ea8776befc95ea2becd8020c7a284677b4161/refs.c#L59-L77>
pub fn is_valid_ref_name(name: &str) -> bool {
    !(name.is_empty()
        || name.contains('\0')
        || name.chars().any(|c| DISALLOWED_CHARACTERS.contains(&c))
        || name.starts_with('.')
        || name.contains("/.")
        || name.contains("..")
        || name.starts_with('/')
        || name.ends_with('/')
        || name.contains("//")
        || name.split('/').any(|component| component.ends_with(".lock"))
        || name.contains("@{"))
}

/// HEAD and the branch heads under `refs/heads`.
pub struct Refs {
    head_path: Utf8PathBuf,
    heads_path: Utf8PathBuf,
}

impl Refs {
    pub fn new(store_root: impl AsRef<Utf8Path>) -> Self {
        let store_root = store_root.as_ref();
        Self {
            head_path: store_root.join("HEAD"),
            heads_path: store_root.join("refs").join("heads"),
        }
    }

    pub fn heads_path(&self) -> &Utf8Path {
        &self.heads_path
    }

    fn branch_path(&self, branch: &str) -> Result<Utf8PathBuf> {
        if !is_valid_ref_name(branch) {
            return Err(Error::InvalidRefName(branch.to_owned()));
        }
        Ok(self.heads_path.join(branch))
    }

    /// Point HEAD at `branch`. The branch itself need not exist yet.
    pub fn init_head(&self, branch: &str) -> Result<()> {
        self.branch_path(branch)?;
        trace!(%branch, "Writing HEAD");
        let mut head = LockedFile::acquire(&self.head_path)?;
        head.write_all(format!("{SYMREF_PREFIX}{HEADS_PREFIX}{branch}\n").as_bytes())?;
        head.commit()
    }

    /// The name of the branch HEAD points at.
    pub fn head_branch(&self) -> Result<String> {
        let contents = std::fs::read_to_string(&self.head_path).at(&self.head_path)?;
        let corrupt = |reason: &str| Error::CorruptRef {
            path: self.head_path.clone(),
            reason: reason.to_owned(),
        };

        let target = contents
            .trim_end()
            .strip_prefix(SYMREF_PREFIX)
            .ok_or_else(|| corrupt("HEAD is not a symbolic ref"))?;
        let branch = target
            .strip_prefix(HEADS_PREFIX)
            .ok_or_else(|| corrupt("HEAD does not point into refs/heads"))?;

        if !is_valid_ref_name(branch) {
            return Err(corrupt("HEAD names an invalid branch"));
        }
        Ok(branch.to_owned())
    }

    /// Point `branch` at `oid`, replacing whatever it pointed at before.
    pub fn update(&self, branch: &str, oid: &Digest) -> Result<()> {
        let path = self.branch_path(branch)?;
        debug!(%branch, %oid, "Updating ref");

        if let Some(parent) = path.parent() {
            if !parent.is_dir() {
                std::fs::create_dir_all(parent).at(parent)?;
            }
        }

        let mut file = LockedFile::acquire(&path)?;
        file.write_all(format!("{oid:x}\n").as_bytes())?;
        file.commit()
    }

    /// The object `branch` points at.
    pub fn resolve(&self, branch: &str) -> Result<Digest> {
        let path = self.branch_path(branch)?;
        trace!(%branch, "Resolving ref");

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NoCommits(branch.to_owned()));
            }
            Err(e) => return Err(e).at(path),
        };

        Digest::from_str(contents.trim_end()).map_err(|e| Error::CorruptRef {
            path,
            reason: e.to_string(),
        })
    }
}
