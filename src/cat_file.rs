use std::io::Write;

use tracing::debug;

use crate::interface::CatFile;
use crate::repo::Repo;
use crate::{Result, FAILURE, SUCCESS};

pub fn handle(repo: &Repo, args: &CatFile) -> Result<u8> {
    match args {
        CatFile::Exists { object } if !repo.database.exists(object) => Ok(FAILURE),
        CatFile::Exists { object } => match repo.database.load(object) {
            // Object exists and is valid
            Ok(_) => Ok(SUCCESS),
            Err(e) => {
                debug!(%object, error = %e, "Object is unreadable");
                eprintln!("error: {e}");
                Ok(FAILURE)
            }
        },
        CatFile::PrettyPrint { object } => {
            let payload = repo.database.read(object)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&payload)?;
            stdout.flush()?;
            Ok(SUCCESS)
        }
        CatFile::Type { object } => {
            println!("{}", repo.database.load(object)?.kind());
            Ok(SUCCESS)
        }
        CatFile::Size { object } => {
            println!("{}", repo.database.load(object)?.payload().len());
            Ok(SUCCESS)
        }
    }
}
