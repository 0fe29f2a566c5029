use std::env;
use std::path::PathBuf;

/// XDG Base Directory paths for kbucket
pub struct XdgPaths;

impl XdgPaths {
    /// Get XDG_CACHE_HOME/kbucket or fallback
    pub fn cache_dir() -> PathBuf {
        env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".cache"))
                    .unwrap_or_else(|| PathBuf::from(".cache"))
            })
            .join("kbucket")
    }

    /// Default root of the content-addressed file cache
    pub fn sha1_cache_dir() -> PathBuf {
        Self::cache_dir().join("sha1")
    }
}
