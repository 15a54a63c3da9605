use camino::Utf8PathBuf;

use crate::codec::CodecError;
use crate::digest::Digest;

/// Errors from the object database and the refs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from the filesystem, with the path that was being accessed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The requested object is not in the database.
    #[error("object not found: {0}")]
    NotFound(Digest),

    /// The object exists, but its decompressed bytes do not have a valid header.
    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: Digest, reason: String },

    #[error("malformed commit: {0}")]
    MalformedCommit(String),

    /// A name or email that cannot be written on a signature line.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("unknown object type '{0}'")]
    UnknownKind(String),

    /// The branch exists by name only: nothing has been committed to it yet.
    #[error("your current branch '{0}' does not have any commits yet")]
    NoCommits(String),

    #[error("corrupt ref '{path}': {reason}")]
    CorruptRef { path: Utf8PathBuf, reason: String },

    #[error("invalid ref name: '{0}'")]
    InvalidRefName(String),

    /// Another writer holds `<ref>.lock`.
    #[error("unable to lock '{0}': lock file already exists")]
    RefLocked(Utf8PathBuf),

    #[error("not a tinygit repository: '{0}'")]
    NotARepository(Utf8PathBuf),
}

impl Error {
    /// Returns `true` for conditions a user can expect to run into on a healthy repository, as
    /// opposed to failures of the filesystem or damaged data.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::NoCommits(_) | Self::InvalidRefName(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Attach a path to an `std::io::Result`.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<Utf8PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<Utf8PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
