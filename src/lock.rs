use std::fs::File;
use std::io::{ErrorKind, Write};

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{Error, IoContext, Result};

/// Exclusive write access to a file, held through `<path>.lock`.
///
/// Writes go to the lock file. [`LockedFile::commit`] renames it over the guarded path;
/// dropping without committing removes the lock and leaves the guarded file untouched.
pub struct LockedFile {
    guarded_path: Utf8PathBuf,
    lock_path: Utf8PathBuf,
    lockfile: Option<File>,
}

impl LockedFile {
    pub fn acquire(path: &Utf8Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::InvalidRefName(path.to_string()))?;
        let lock_path = path.with_file_name(format!("{file_name}.lock"));

        match File::options()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::RefLocked(lock_path)),
            Err(e) => Err(e).at(lock_path),
            Ok(lockfile) => Ok(Self {
                guarded_path: path.to_owned(),
                lock_path,
                lockfile: Some(lockfile),
            }),
        }
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        match self.lockfile.as_mut() {
            Some(file) => file.write_all(bytes).at(&self.lock_path),
            None => unreachable!("lock file is only taken by commit"),
        }
    }

    /// Flush the lock file and move it over the guarded path.
    pub fn commit(mut self) -> Result<()> {
        if let Some(mut file) = self.lockfile.take() {
            file.flush().at(&self.lock_path)?;
        }
        let renamed = std::fs::rename(&self.lock_path, &self.guarded_path);
        if renamed.is_err() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
        renamed.at(&self.guarded_path)
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        // still holding the file means commit never ran
        if self.lockfile.take().is_some() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
