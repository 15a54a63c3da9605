use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;

use crate::codec;
use crate::digest::Digest;
use crate::error::{Error, IoContext, Result};
use crate::object::{self, Object, ObjectKind};
use crate::util;

pub struct Database {
    database_root: Utf8PathBuf,
}

impl Database {
    pub fn new(store_root: impl AsRef<Utf8Path>) -> Self {
        Self {
            database_root: store_root.as_ref().join("objects"),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.database_root
    }

    /// Store `payload` as an object of type `kind` and return its id.
    ///
    /// An existing file for the same id is replaced, with identical bytes.
    pub fn write(&self, payload: &[u8], kind: ObjectKind) -> Result<Digest> {
        let content = object::encode(kind, payload);
        let oid = Digest::new(&content);
        trace!(%oid, %kind, len = payload.len(), "Writing object to database");

        let compressed = codec::compress(&content)?;

        let object_path = self.object_path(&oid);
        let dirname = self.shard_dir(&oid);

        if !dirname.is_dir() {
            debug!(path = ?dirname, "Creating shard directory");
            std::fs::create_dir_all(&dirname).at(&dirname)?;
        }

        let temp_path = dirname.join(util::tmp_file_name());
        let written = std::fs::write(&temp_path, &compressed)
            .at(&temp_path)
            .and_then(|()| std::fs::rename(&temp_path, &object_path).at(&object_path));

        // a half-written or unrenamed temp file must not outlive a failed write
        if written.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        written?;

        Ok(oid)
    }

    /// Store an [`Object`] and return its id.
    pub fn store(&self, obj: &Object) -> Result<Digest> {
        self.write(obj.payload(), obj.kind())
    }

    fn shard_dir(&self, oid: &Digest) -> Utf8PathBuf {
        let oid = oid.to_hex();
        self.database_root.join(&oid[..2])
    }

    pub fn object_path(&self, oid: &Digest) -> Utf8PathBuf {
        let mut x = self.database_root.to_owned();
        let oid = oid.to_hex();
        let (prefix, suffix) = oid.split_at(2);
        debug_assert_eq!(prefix.len(), 2);
        x.push(prefix);
        x.push(suffix);
        x
    }

    pub fn exists(&self, oid: &Digest) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read the full decompressed object, header included.
    pub fn read_to_vec(&self, oid: &Digest) -> Result<Vec<u8>> {
        trace!(object = %oid, "Reading object from database");

        let object_path = self.object_path(oid);

        let compressed = match std::fs::read(&object_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(*oid));
            }
            Err(e) => return Err(e).at(&object_path),
        };

        Ok(codec::decompress(&compressed)?)
    }

    /// Read the payload of an object, without its `"{type} {len}\0"` header.
    pub fn read(&self, oid: &Digest) -> Result<Vec<u8>> {
        let mut bytes = self.read_to_vec(oid)?;
        let nul_idx = memchr::memchr(b'\0', &bytes).ok_or_else(|| Error::CorruptObject {
            oid: *oid,
            reason: "no NUL byte terminating the header".into(),
        })?;
        bytes.drain(..=nul_idx);
        Ok(bytes)
    }

    /// Read an object and check its header: the type must be known and the declared length
    /// must match the payload.
    pub fn load(&self, oid: &Digest) -> Result<Object> {
        let mut bytes = self.read_to_vec(oid)?;

        let corrupt = |reason: &str| Error::CorruptObject {
            oid: *oid,
            reason: reason.to_owned(),
        };

        let nul_idx = memchr::memchr(b'\0', &bytes)
            .ok_or_else(|| corrupt("no NUL byte terminating the header"))?;
        let space_idx = memchr::memchr(b' ', &bytes[..nul_idx])
            .ok_or_else(|| corrupt("no space in the header"))?;

        let kind = std::str::from_utf8(&bytes[..space_idx])
            .map_err(|_| corrupt("object type is not valid UTF-8"))?;
        let kind = ObjectKind::from_str(kind)?;

        let len = std::str::from_utf8(&bytes[space_idx + 1..nul_idx])
            .ok()
            .and_then(|len| len.parse::<usize>().ok())
            .ok_or_else(|| corrupt("object length is not a decimal number"))?;

        bytes.drain(..=nul_idx);

        if bytes.len() != len {
            return Err(corrupt(&format!(
                "header declares {len} bytes but the payload has {}",
                bytes.len()
            )));
        }

        Ok(Object::new(kind, bytes))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempdir::TempDir;

    use super::*;

    fn scratch() -> color_eyre::Result<(TempDir, Database)> {
        let dir = TempDir::new("tinygit-db")?;
        let root = Utf8Path::from_path(dir.path()).unwrap().to_owned();
        Ok((dir, Database::new(root)))
    }

    /// Write raw (already compressed) bytes at the path for `oid`.
    fn plant(db: &Database, oid: &Digest, bytes: &[u8]) {
        let path = db.object_path(oid);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_roundtrip() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        for (payload, kind) in [
            (&b"hello\n"[..], ObjectKind::Blob),
            (&b""[..], ObjectKind::Blob),
            (&b"\0\0\0binary\xff"[..], ObjectKind::Blob),
            (&b"tree x\n\nmsg\n"[..], ObjectKind::Commit),
        ] {
            let oid = db.write(payload, kind)?;
            assert_eq!(db.read(&oid)?, payload);
            assert_eq!(db.load(&oid)?.kind(), kind);
        }
        Ok(())
    }

    #[test]
    fn test_known_blob_path() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        let oid = db.write(b"hello\n", ObjectKind::Blob)?;
        assert_eq!(oid.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        let expected = db
            .root()
            .join("ce")
            .join("013625030ba8dba906f756967f9e9ca394464a");
        assert!(expected.is_file());
        assert_eq!(db.object_path(&oid), expected);
        Ok(())
    }

    #[test]
    fn test_sharding() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        for i in 0..32 {
            let oid = db.write(format!("payload {i}").as_bytes(), ObjectKind::Blob)?;
            let path = db.object_path(&oid);
            let dir = path.parent().unwrap().file_name().unwrap();
            let file = path.file_name().unwrap();
            assert_eq!(dir.len(), 2);
            assert_eq!(file.len(), 38);
            assert_eq!(format!("{dir}{file}"), oid.to_hex());
            assert_eq!(path.parent().unwrap().parent().unwrap(), db.root());
        }
        Ok(())
    }

    #[test]
    fn test_idempotent_write() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        let first = db.write(b"same bytes", ObjectKind::Blob)?;
        let stored = std::fs::read(db.object_path(&first)).unwrap();
        let second = db.write(b"same bytes", ObjectKind::Blob)?;
        assert_eq!(first, second);
        assert_eq!(std::fs::read(db.object_path(&second)).unwrap(), stored);

        // nothing but the object itself is left in the shard directory
        let shard = db.object_path(&first).parent().unwrap().to_owned();
        assert_eq!(std::fs::read_dir(shard).unwrap().count(), 1);
        Ok(())
    }

    #[test]
    fn test_distinct_content_distinct_ids() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        let a = db.write(b"a", ObjectKind::Blob)?;
        let b = db.write(b"b", ObjectKind::Blob)?;
        let a_commit = db.write(b"a", ObjectKind::Commit)?;
        assert_ne!(a, b);
        assert_ne!(a, a_commit);
        Ok(())
    }

    #[test]
    fn test_missing_is_not_found() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        let oid = Digest::new(b"never written");
        assert!(!db.exists(&oid));
        assert!(matches!(db.read(&oid), Err(Error::NotFound(x)) if x == oid));
        Ok(())
    }

    #[test]
    /// An empty blob reads back as an empty payload, not as a missing object.
    fn test_empty_blob_is_not_missing() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        let oid = db.write(b"", ObjectKind::Blob)?;
        assert_eq!(oid.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
        assert!(db.exists(&oid));
        assert_eq!(db.read(&oid)?, Vec::<u8>::new());
        Ok(())
    }

    #[test]
    fn test_large_payload() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        let payload = b"abcdefgh".repeat(512 * 1024);
        let oid = db.write(&payload, ObjectKind::Blob)?;
        let read = db.read(&oid)?;
        assert_eq!(read.len(), payload.len());
        assert!(read == payload);
        Ok(())
    }

    #[test]
    fn test_missing_nul_is_corrupt() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        let oid = Digest::new(b"bogus");
        plant(&db, &oid, &codec::compress(b"blob 5 hello").unwrap());
        assert!(matches!(db.read(&oid), Err(Error::CorruptObject { .. })));
        Ok(())
    }

    #[test]
    fn test_undecodable_file_is_codec_error() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;
        let oid = Digest::new(b"bogus");
        plant(&db, &oid, b"not compressed at all");
        assert!(matches!(db.read(&oid), Err(Error::Codec(_))));
        Ok(())
    }

    #[test]
    fn test_load_checks_header() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;

        let oid = Digest::new(b"wrong length");
        plant(&db, &oid, &codec::compress(b"blob 9\0hello\n").unwrap());
        assert!(matches!(db.load(&oid), Err(Error::CorruptObject { .. })));
        // `read` only strips the header
        assert_eq!(db.read(&oid)?, b"hello\n");

        let oid = Digest::new(b"unknown kind");
        plant(&db, &oid, &codec::compress(b"tag 2\0hi").unwrap());
        assert!(matches!(db.load(&oid), Err(Error::UnknownKind(k)) if k == "tag"));
        Ok(())
    }

    #[test]
    /// A write that cannot be put in place fails and leaves no temp file behind.
    fn test_failed_write_leaves_no_temp_file() -> color_eyre::Result<()> {
        let (_dir, db) = scratch()?;

        let oid = Digest::new(&object::encode(ObjectKind::Blob, b"blocked"));
        let object_path = db.object_path(&oid);
        std::fs::create_dir_all(object_path.join("occupied"))?;

        assert!(matches!(
            db.write(b"blocked", ObjectKind::Blob),
            Err(Error::Io { .. })
        ));

        let leftovers = std::fs::read_dir(db.shard_dir(&oid))?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(leftovers, vec![std::ffi::OsString::from(&oid.to_hex()[2..])]);
        Ok(())
    }
}
