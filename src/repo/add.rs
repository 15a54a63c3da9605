use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;
use walkdir::WalkDir;

use crate::digest::Digest;
use crate::error::{IoContext, Result};
use crate::object::ObjectKind;

/// A file written to the database as a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    pub path: Utf8PathBuf,
    pub oid: Digest,
}

impl super::Repo {
    /// Write every file under `paths` to the database as a blob.
    ///
    /// Relative paths are taken from the repo directory. Directories are walked, skipping the
    /// store directory itself. Nothing is recorded besides the objects.
    pub fn add(&self, paths: &[Utf8PathBuf]) -> Result<Vec<Staged>> {
        let mut staged = Vec::new();
        for path in paths {
            trace!(?path, "Adding path to repo");
            for file in self.list_files(path)? {
                let data = std::fs::read(self.dir.join(&file)).at(&file)?;
                let oid = self.database.write(&data, ObjectKind::Blob)?;
                debug!(path = ?file, %oid, "Stored blob");
                staged.push(Staged { path: file, oid });
            }
        }
        Ok(staged)
    }

    /// Files under `path`, relative to the repo directory when they are inside it.
    fn list_files(&self, path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        let abs_path = self.dir.join(path);
        let metadata = std::fs::metadata(&abs_path).at(path)?;
        if !metadata.is_dir() {
            return Ok(vec![self.relative(&abs_path)]);
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(&abs_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != super::STORE_DIR);

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from).at(path)?;
            if entry.file_type().is_dir() {
                continue;
            }
            match Utf8Path::from_path(entry.path()) {
                Some(file) => entries.push(self.relative(file)),
                None => warn!(path = ?entry.path(), "Skipping path that is not valid unicode"),
            }
        }
        Ok(entries)
    }

    fn relative(&self, path: &Utf8Path) -> Utf8PathBuf {
        path.strip_prefix(&self.dir).unwrap_or(path).to_owned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempdir::TempDir;

    use crate::error::Error;
    use crate::repo::Repo;

    #[test]
    fn test_add_single_file() -> color_eyre::Result<()> {
        let dir = TempDir::new("tinygit-add")?;
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        let repo = Repo::init(root)?;

        std::fs::write(root.join("hello.txt"), "hello\n")?;
        let staged = repo.add(&["hello.txt".into()])?;

        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].path, "hello.txt");
        assert_eq!(
            staged[0].oid.to_hex(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
        assert_eq!(repo.database.read(&staged[0].oid)?, b"hello\n");
        Ok(())
    }

    #[test]
    fn test_add_directory_skips_store() -> color_eyre::Result<()> {
        let dir = TempDir::new("tinygit-add")?;
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        let repo = Repo::init(root)?;

        crate::create_test_files!(root, ["b", "a/one", "a/two"]);
        let staged = repo.add(&[".".into()])?;

        let paths = staged
            .iter()
            .map(|s| s.path.as_str().trim_start_matches("./").to_owned())
            .collect::<Vec<_>>();
        assert_eq!(paths, ["a/one", "a/two", "b"]);
        for s in &staged {
            assert!(repo.database.exists(&s.oid));
        }
        Ok(())
    }

    #[test]
    fn test_add_missing_file() -> color_eyre::Result<()> {
        let dir = TempDir::new("tinygit-add")?;
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        let repo = Repo::init(root)?;

        let err = repo.add(&["nope".into()]).unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path == "nope"));
        Ok(())
    }
}
