//! Streaming download with on-the-fly hashing

use crate::hashing::ContentHasher;
use kbucket_core::{ContentHash, Error, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Download `url` into `dest`, hashing the bytes as they are written.
///
/// `dest` is created (or truncated). On error the caller is responsible for
/// removing the partial file.
pub(crate) async fn download_to(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(ContentHash, u64)> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::transport_message(
            url,
            format!("download failed with HTTP status {status}"),
        ));
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| Error::file_system(dest, "create download file", e))?;
    let mut hasher = ContentHasher::new();

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::transport(url, e))?
    {
        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::file_system(dest, "write download chunk", e))?;
    }

    file.flush()
        .await
        .map_err(|e| Error::file_system(dest, "flush download file", e))?;
    file.sync_all()
        .await
        .map_err(|e| Error::file_system(dest, "sync download file", e))?;

    let bytes = hasher.bytes();
    Ok((hasher.finish(), bytes))
}
