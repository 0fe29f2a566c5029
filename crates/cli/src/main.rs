use clap::Parser;
use kbucket_config::ConfigBuilder;
use kbucket_remote::{AliasResolver, NoAliases, StaticAliases};
use kbucket_resolver::Resolver;
use std::path::PathBuf;
use std::sync::Arc;

mod commands;
mod execute;

use commands::Commands;

#[derive(Parser)]
#[command(name = "kbucket")]
#[command(about = "Resolve, fetch and cache files by content hash", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the kbucket hub
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,

    /// Root directory of the local content cache
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Share to search by hash (can be specified multiple times)
    #[arg(long = "share", global = true, value_name = "ID")]
    shares: Vec<String>,

    /// Share alias translation (can be specified multiple times)
    #[arg(long = "alias", global = true, value_name = "COLLECTION.KEY=SHARE")]
    aliases: Vec<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    kbucket_utils::logging::init_with_default(default_filter)
        .map_err(|e| eyre::eyre!("failed to initialise logging: {e}"))?;

    let mut builder = ConfigBuilder::from_env()?;
    if let Some(url) = cli.url {
        builder = builder.with_remote_url(url);
    }
    if let Some(dir) = cli.cache_dir {
        builder = builder.with_cache_dir(dir);
    }
    if !cli.shares.is_empty() {
        builder = builder.with_share_ids(cli.shares);
    }
    let config = builder.build()?;

    let resolver = Resolver::from_config(&config, alias_table(&cli.aliases)?)?;
    tracing::debug!(
        remote = config.remote_url(),
        cache = %config.cache_dir().display(),
        "resolver ready"
    );
    cli.command.execute(&resolver).await
}

/// Alias translations given on the command line
fn alias_table(entries: &[String]) -> eyre::Result<Arc<dyn AliasResolver>> {
    if entries.is_empty() {
        return Ok(Arc::new(NoAliases));
    }

    let mut aliases = StaticAliases::new();
    for entry in entries {
        let parsed = entry
            .split_once('=')
            .and_then(|(alias, share)| alias.split_once('.').map(|(c, k)| (c, k, share)));
        match parsed {
            Some((collection, key, share))
                if !collection.is_empty() && !key.is_empty() && !share.is_empty() =>
            {
                aliases.insert(collection, key, share);
            }
            _ => eyre::bail!("invalid alias '{entry}', expected COLLECTION.KEY=SHARE"),
        }
    }
    Ok(Arc::new(aliases))
}
