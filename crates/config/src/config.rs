//! Centralized configuration for kbucket
//!
//! `Config` holds the remote hub URL, the local cache root, the default share
//! list and the default search policy. All fields are validated when the
//! configuration is built, so downstream components never re-check them.

use kbucket_core::{
    constants::{
        DEFAULT_REMOTE_URL, DEFAULT_TIMEOUT_SECS, KBUCKET_CACHE_DIR_VAR, KBUCKET_LOAD_LOCAL_VAR,
        KBUCKET_LOAD_REMOTE_VAR, KBUCKET_SHARE_IDS_VAR, KBUCKET_TIMEOUT_VAR, KBUCKET_URL_VAR,
    },
    Error, Result, ShareId,
};
use kbucket_utils::xdg::XdgPaths;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Immutable, validated configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    remote_url: String,
    cache_dir: PathBuf,
    share_ids: Vec<String>,
    load_local: bool,
    load_remote: bool,
    request_timeout: Duration,
}

impl Config {
    /// Start from the built-in defaults
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Read the `KBUCKET_*` environment variables once
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        ConfigBuilder::from_lookup(lookup)?.build()
    }

    /// Base URL of the remote hub, without a trailing slash
    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Root directory of the local content cache
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Shares searched, in priority order, when no share is given per call
    pub fn share_ids(&self) -> &[String] {
        &self.share_ids
    }

    pub fn load_local(&self) -> bool {
        self.load_local
    }

    pub fn load_remote(&self) -> bool {
        self.load_remote
    }

    /// Transport-level timeout applied to every HTTP request
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            cache_dir: XdgPaths::sha1_cache_dir(),
            share_ids: Vec::new(),
            load_local: true,
            load_remote: true,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Builder for creating a validated [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Builder seeded from the `KBUCKET_*` environment variables, so callers
    /// can layer their own overrides on top before building
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builder seeded from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::new();

        if let Some(url) = lookup(KBUCKET_URL_VAR) {
            builder = builder.with_remote_url(url);
        }
        if let Some(dir) = lookup(KBUCKET_CACHE_DIR_VAR) {
            builder = builder.with_cache_dir(dir);
        }
        if let Some(ids) = lookup(KBUCKET_SHARE_IDS_VAR) {
            builder = builder.with_share_ids(
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(value) = lookup(KBUCKET_LOAD_LOCAL_VAR) {
            builder = builder.with_load_local(parse_bool(KBUCKET_LOAD_LOCAL_VAR, &value)?);
        }
        if let Some(value) = lookup(KBUCKET_LOAD_REMOTE_VAR) {
            builder = builder.with_load_remote(parse_bool(KBUCKET_LOAD_REMOTE_VAR, &value)?);
        }
        if let Some(value) = lookup(KBUCKET_TIMEOUT_VAR) {
            let secs = value.trim().parse::<u64>().map_err(|_| {
                Error::configuration(format!(
                    "{KBUCKET_TIMEOUT_VAR} must be a whole number of seconds, got '{value}'"
                ))
            })?;
            builder = builder.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(builder)
    }

    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote_url = url.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    pub fn with_share_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.share_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_load_local(mut self, enabled: bool) -> Self {
        self.config.load_local = enabled;
        self
    }

    pub fn with_load_remote(mut self, enabled: bool) -> Self {
        self.config.load_remote = enabled;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<Config> {
        let mut config = self.config;

        config.remote_url = normalize_remote_url(&config.remote_url)?;

        if config.cache_dir.as_os_str().is_empty() {
            return Err(Error::configuration("cache directory must not be empty"));
        }

        for id in &config.share_ids {
            ShareId::parse(id)?;
        }

        if config.request_timeout.is_zero() {
            return Err(Error::configuration("request timeout must be greater than zero"));
        }

        tracing::debug!(
            remote_url = %config.remote_url,
            cache_dir = %config.cache_dir.display(),
            shares = config.share_ids.len(),
            "configuration built"
        );

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the hub URL is http(s) and strip any trailing slash
pub(crate) fn normalize_remote_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::configuration(format!("invalid remote URL '{raw}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::configuration(format!(
            "remote URL '{raw}' must use http or https"
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration(format!(
            "{var} must be a boolean, got '{value}'"
        ))),
    }
}
