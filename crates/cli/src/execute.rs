use crate::commands::Commands;
use kbucket_resolver::{ListOptions, ResolveRequest, Resolver};

impl Commands {
    pub async fn execute(self, resolver: &Resolver) -> eyre::Result<()> {
        match self {
            Commands::Find {
                reference,
                no_local,
                no_remote,
            } => {
                let mut request = ResolveRequest::reference(&reference);
                if no_local {
                    request = request.with_local(false);
                }
                if no_remote {
                    request = request.with_remote(false);
                }
                match resolver.resolve(&request).await? {
                    Some(resolved) => println!("{}", resolved.location),
                    None => eyre::bail!("{reference}: not found"),
                }
            }
            Commands::Realize { reference, target } => {
                let request = ResolveRequest::reference(&reference);
                let path = match target {
                    Some(target) => resolver.fetch_to(&request, &target).await?,
                    None => resolver.fetch_to_local(&request).await?,
                };
                match path {
                    Some(path) => println!("{}", path.display()),
                    None => eyre::bail!("{reference}: not found"),
                }
            }
            Commands::Sha1 { reference } => match resolver.hash_of(&reference).await? {
                Some(hash) => println!("{hash}"),
                None => eyre::bail!("{reference}: not found"),
            },
            Commands::Ls {
                reference,
                recursive,
                hashes,
            } => {
                let options = ListOptions::default()
                    .recursive(recursive)
                    .include_hashes(hashes);
                match resolver.directory().list(&reference, options).await? {
                    Some(listing) => println!("{}", serde_json::to_string_pretty(&listing)?),
                    None => eyre::bail!("{reference}: directory not available"),
                }
            }
            Commands::DirHash { reference } => {
                match resolver.directory().content_hash(&reference).await? {
                    Some(hash) => println!("{hash}"),
                    None => eyre::bail!("{reference}: directory not available"),
                }
            }
            Commands::Cache { command } => command.execute(resolver.store())?,
        }
        Ok(())
    }
}
