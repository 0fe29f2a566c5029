use clap::Subcommand;
use std::path::PathBuf;

pub mod cache;

use self::cache::CacheCommands;

#[derive(Subcommand)]
pub enum Commands {
    /// Print where a reference resolves to, without downloading anything
    Find {
        /// sha1://<hash>, kbucket://<share>/<path> or a local path
        reference: String,

        /// Do not look in the local cache
        #[arg(long)]
        no_local: bool,

        /// Do not query the hub
        #[arg(long)]
        no_remote: bool,
    },

    /// Make a reference available locally and print its path
    Realize {
        /// sha1://<hash>, kbucket://<share>/<path> or a local path
        reference: String,

        /// Place the file here instead of in the cache
        #[arg(short, long, value_name = "PATH")]
        target: Option<PathBuf>,
    },

    /// Print the content hash of a reference
    Sha1 {
        reference: String,
    },

    /// List a local or kbucket:// directory as JSON
    Ls {
        reference: String,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Hash local files too (hub listings always carry checksums)
        #[arg(long)]
        hashes: bool,
    },

    /// Print the content hash of a whole directory tree
    DirHash {
        reference: String,
    },

    /// Manage the local content cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}
