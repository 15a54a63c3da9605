use camino::Utf8PathBuf;
use clap::Parser;
use clap::Subcommand;

use crate::commit::Identity;
use crate::digest::Digest;

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Create an empty store in the working directory
    Init,

    /// Store the contents of files as blobs
    Add {
        #[arg(required = true, num_args = 1..)]
        path: Vec<Utf8PathBuf>,
    },

    /// Record a commit on the current branch
    Commit {
        #[arg(short, long, env = "TINYGIT_COMMIT_MESSAGE")]
        message: String,

        /// Tree id to record in the commit. Defaults to the empty tree.
        #[arg(long, value_name = "tree-id")]
        tree: Option<String>,
    },

    /// Show the latest commit on the current branch
    Log,

    #[command(subcommand)]
    CatFile(CatFile),
}

#[derive(Clone, Debug, Subcommand)]
pub enum CatFile {
    /// Exit with status 0 if `object` exists and is a valid object. If `object` is missing or
    /// corrupt, exit with status 1.
    #[command(short_flag = 'e')]
    Exists {
        #[arg(value_name = "object")]
        object: Digest,
    },

    /// Print the payload of `object`
    #[command(short_flag = 'p')]
    PrettyPrint {
        #[arg(value_name = "object")]
        object: Digest,
    },

    /// Print the type of `object` to stdout
    #[command(short_flag = 't')]
    Type {
        #[arg(value_name = "object")]
        object: Digest,
    },

    /// Print the size of `object` to stdout
    #[command(short_flag = 's')]
    Size {
        #[arg(value_name = "object")]
        object: Digest,
    },
}

#[derive(Debug, Parser)]
#[command(name = "tinygit", version, about = "A tiny content-addressed object store")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', global = true)]
    pub path: Option<Utf8PathBuf>,

    #[arg(
        long,
        env = "TINYGIT_AUTHOR_NAME",
        default_value = "Your Name",
        global = true
    )]
    pub author_name: String,

    #[arg(
        long,
        env = "TINYGIT_AUTHOR_EMAIL",
        default_value = "you@example.com",
        global = true
    )]
    pub author_email: String,
}

impl Opt {
    pub fn identity(&self) -> Identity {
        Identity {
            name: self.author_name.clone(),
            email: self.author_email.clone(),
        }
    }
}
