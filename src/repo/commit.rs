use tracing::*;

use crate::commit::{Commit, Identity};
use crate::digest::Digest;
use crate::error::Result;
use crate::object::ObjectKind;
use crate::timestamp::Timestamp;

/// The outcome of a commit: where it went and what was written.
#[derive(Debug, Clone)]
pub struct Committed {
    pub branch: String,
    pub oid: Digest,
    pub commit: Commit,
}

impl super::Repo {
    /// Record a commit on the branch HEAD points at.
    ///
    /// `tree` is taken as given. Without one, the empty tree is stored and used, so the commit
    /// always names an object that exists.
    pub fn commit(
        &self,
        message: &str,
        tree: Option<&str>,
        identity: &Identity,
    ) -> Result<Committed> {
        trace!(path = ?self.dir, %message, "Starting commit");

        let tree_id = match tree {
            Some(tree) => tree.to_owned(),
            None => self.database.write(b"", ObjectKind::Tree)?.to_hex(),
        };

        let now = Timestamp::now();
        let commit = Commit::new(
            tree_id,
            identity.sign(now.clone()),
            identity.sign(now),
            message,
        )?;

        let oid = self.database.store(&commit.to_object())?;

        let branch = self.refs.head_branch()?;
        self.refs.update(&branch, &oid)?;
        debug!(%branch, %oid, "Created commit");

        Ok(Committed {
            branch,
            oid,
            commit,
        })
    }
}
