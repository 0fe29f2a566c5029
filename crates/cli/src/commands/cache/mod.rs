use clap::Subcommand;
use kbucket_cache::ContentStore;
use kbucket_core::ContentHash;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Copy a file into the cache and print its hash and cached path
    Add {
        path: PathBuf,

        /// Move the file instead of copying it
        #[arg(long = "move")]
        move_file: bool,
    },
    /// Print the cached or hinted path holding a hash
    Locate {
        hash: String,
    },
}

impl CacheCommands {
    pub fn execute(self, store: &ContentStore) -> eyre::Result<()> {
        match self {
            CacheCommands::Add { path, move_file } => {
                let (hash, entry) = if move_file {
                    store.adopt(&path)?
                } else {
                    store.copy_in(&path)?
                };
                println!("{hash}  {}", entry.display());
                Ok(())
            }
            CacheCommands::Locate { hash } => {
                let hash = ContentHash::parse(&hash)?;
                match store.locate(&hash)? {
                    Some(path) => println!("{}", path.display()),
                    None => eyre::bail!("{hash}: not in cache"),
                }
                Ok(())
            }
        }
    }
}
