//! HTTP client for the kbucket hub
//!
//! Every request is a JSON GET against `{base}/{share}/...`; reachability
//! probes are HEAD requests against candidate download URLs. Timeouts are
//! the transport's business and are set on the underlying `reqwest::Client`.

use crate::protocol::{FindResponse, ReadDirResponse};
use kbucket_core::{ContentHash, Error, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// Candidate download locations for a hash within one share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindHit {
    pub urls: Vec<String>,
    pub size: Option<u64>,
}

/// Client for the hub's lookup, metadata and listing endpoints
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Same transport, different hub
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
            http: self.http.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `{base}/{share}/{endpoint...}/{path...}` with every segment
    /// percent-encoded
    fn share_url(&self, share_id: &str, endpoint: &[&str], path: &str) -> Result<String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::configuration(format!("invalid hub URL '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::configuration(format!("hub URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push(share_id)
            .extend(endpoint)
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url.into())
    }

    /// Ask a share for the download URLs of `hash`.
    ///
    /// `Ok(None)` when the share does not have it. A response with
    /// `success=false` is a [`Error::RemoteProtocol`].
    pub async fn find(&self, share_id: &str, hash: &ContentHash) -> Result<Option<FindHit>> {
        let url = self.share_url(share_id, &["api", "find"], hash.as_str())?;
        let response: FindResponse = self.get_json(&url).await?;

        if !response.success {
            return Err(Error::remote_protocol(
                &url,
                format!(
                    "error finding file in share: {}",
                    response.error.as_deref().unwrap_or("unknown error")
                ),
            ));
        }

        if !response.found {
            debug!(share = share_id, hash = %hash, "not found in share");
            return Ok(None);
        }

        Ok(Some(FindHit {
            size: response.results.first().and_then(|r| r.size),
            urls: response.urls,
        }))
    }

    /// Metadata object for a file path within a share.
    ///
    /// Any transport or parse failure means "not found" here.
    pub async fn file_metadata(&self, share_id: &str, path: &str) -> Option<serde_json::Value> {
        let url = match self.share_url(share_id, &["prv"], path) {
            Ok(url) => url,
            Err(e) => {
                debug!(share = share_id, path, error = %e, "no metadata URL for path");
                return None;
            }
        };
        match self.get_json::<serde_json::Value>(&url).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(url = %url, error = %e, "no metadata for path");
                None
            }
        }
    }

    /// Listing of a directory within a share; `Ok(None)` when the hub
    /// answers `success=false`
    pub async fn read_dir(&self, share_id: &str, path: &str) -> Result<Option<ReadDirResponse>> {
        let url = self.share_url(share_id, &["api", "readdir"], path)?;
        let response: ReadDirResponse = self.get_json(&url).await?;
        if !response.success {
            debug!(url = %url, "readdir unsuccessful");
            return Ok(None);
        }
        Ok(Some(response))
    }

    /// Whether `url` answers a HEAD request with a success status
    pub async fn probe(&self, url: &str) -> bool {
        match self.http.head(url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                debug!(url = %url, status = %response.status(), ok, "probed candidate");
                ok
            }
            Err(e) => {
                warn!(url = %url, error = %e, "candidate unreachable");
                false
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport_message(
                url,
                format!("unexpected HTTP status {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(url, e))?;

        serde_json::from_slice(&body)
            .map_err(|e| Error::remote_protocol(url, format!("unable to parse JSON response: {e}")))
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
