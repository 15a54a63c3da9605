#[cfg(test)]
mod test;

mod cat_file;
mod codec;
mod commit;
mod digest;
mod error;
mod interface;
mod lock;
mod object;
mod repo;
mod timestamp;
mod util;

use std::ffi::OsString;
use std::io::{IsTerminal, Write};
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use color_eyre::eyre::Context;
pub use color_eyre::Result;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::interface::*;
use crate::repo::Repo;

/// Exit status for success, and for expected conditions reported as `fatal: ...`.
pub const SUCCESS: u8 = 0;
/// Exit status for usage errors and fatal errors.
pub const FAILURE: u8 = 1;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let opt = match parse_args(std::env::args_os()) {
        Ok(opt) => opt,
        Err(code) => return Ok(ExitCode::from(code)),
    };

    let default_filter = if opt.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let path = match opt.path {
        Some(ref path) => path
            .canonicalize_utf8()
            .wrap_err(format!("Directory not found: '{path}'"))?,
        None => Utf8PathBuf::try_from(std::env::current_dir()?)
            .wrap_err("Current directory is not valid unicode")?,
    };

    Ok(ExitCode::from(exit_code(run(&opt, &path))))
}

/// Parse the command line. On failure the usage or help text has been printed, and the exit
/// status is returned.
fn parse_args<I, T>(args: I) -> std::result::Result<Opt, u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Opt::try_parse_from(args).map_err(|e| {
        let _ = e.print();
        // --help and --version are not usage errors
        if e.use_stderr() {
            FAILURE
        } else {
            SUCCESS
        }
    })
}

/// Turn the outcome of a command into an exit status, reporting any error on stderr.
fn exit_code(result: Result<u8>) -> u8 {
    match result {
        Ok(code) => code,
        Err(report) => match report.downcast_ref::<error::Error>() {
            Some(e) if e.is_expected() => {
                eprintln!("fatal: {e}");
                SUCCESS
            }
            _ => {
                eprintln!("Error: {report:?}");
                FAILURE
            }
        },
    }
}

/// Create (or find) the store under `path` and describe what happened.
fn init(path: &Utf8Path) -> Result<String> {
    let existed = Repo::open(path).is_ok();
    let repo = Repo::init(path)?;
    Ok(if existed {
        format!(
            "Reinitialized existing tinygit repository in {}/",
            repo.store_root()
        )
    } else {
        format!(
            "Initialized empty tinygit repository in {}/",
            repo.store_root()
        )
    })
}

fn run(opt: &Opt, path: &Utf8Path) -> Result<u8> {
    if matches!(opt.command, Command::Init) {
        println!("{}", init(path)?);
        return Ok(SUCCESS);
    }

    let repo = Repo::open(path)?;

    match &opt.command {
        Command::Init => unreachable!(),
        Command::Add { path } => {
            for staged in repo.add(path)? {
                println!("Staged {} as blob {}", staged.path, staged.oid);
            }
        }
        Command::Commit { message, tree } => {
            let committed = repo.commit(message, tree.as_deref(), &opt.identity())?;
            println!(
                "[{} {}] {}",
                committed.branch,
                committed.oid.short(),
                committed.commit.message()
            );
        }
        Command::Log => {
            let entry = repo.log()?;
            let choice = if std::io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            };
            let mut stdout = StandardStream::stdout(choice);
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            write!(stdout, "commit {} (HEAD -> {})", entry.oid, entry.branch)?;
            stdout.reset()?;
            writeln!(stdout)?;

            let commit = &entry.commit;
            writeln!(stdout, "tree {}", commit.tree_id())?;
            writeln!(stdout, "author {}", commit.author())?;
            writeln!(stdout, "committer {}", commit.committer())?;
            writeln!(stdout)?;
            writeln!(stdout, "{}", commit.message())?;
            stdout.flush()?;
        }
        Command::CatFile(args) => return cat_file::handle(&repo, args),
    }
    Ok(SUCCESS)
}
