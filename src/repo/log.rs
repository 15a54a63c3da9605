use tracing::trace;

use crate::commit::Commit;
use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::object::ObjectKind;

/// The tip of the current branch.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub branch: String,
    pub oid: Digest,
    pub commit: Commit,
}

impl super::Repo {
    /// Resolve the branch HEAD points at and read the commit it names.
    ///
    /// Commits carry no parents, so the history is this single entry.
    pub fn log(&self) -> Result<LogEntry> {
        let branch = self.refs.head_branch()?;
        let oid = self.refs.resolve(&branch)?;
        trace!(%branch, %oid, "Reading branch tip");
        let object = self.database.load(&oid)?;
        if object.kind() != ObjectKind::Commit {
            return Err(Error::MalformedCommit(format!(
                "{branch} points at a {}, not a commit: {oid}",
                object.kind()
            )));
        }
        let commit = Commit::parse(object.payload())?;
        Ok(LogEntry {
            branch,
            oid,
            commit,
        })
    }
}
