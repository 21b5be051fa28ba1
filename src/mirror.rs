//! HTTP access to TeX Live mirrors.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::dated_mirror_url;
use crate::executor::{RetriesExhausted, RetryExecutor};
use crate::traits::{FetchError, MirrorClient};

/// [`MirrorClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestMirrorClient {
    client: reqwest::Client,
}

impl ReqwestMirrorClient {
    /// `timeout` bounds connecting and each wait for more data; a transfer
    /// that keeps making progress is never cut off here.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    async fn get_ok(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

fn request_error(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Request {
        url: url.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl MirrorClient for ReqwestMirrorClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get_ok(url).await?;
        let body = response.bytes().await.map_err(|e| request_error(url, e))?;
        Ok(body.to_vec())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut response = self.get_ok(url).await?;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await.map_err(|e| request_error(url, e))? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(url, bytes = written, "Downloaded");
        Ok(written)
    }

    async fn exists(&self, url: &str) -> Result<bool, FetchError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;
        Ok(response.status() != StatusCode::NOT_FOUND)
    }
}

/// Picks the snapshot mirror for `today`.
///
/// Today's snapshot may not be published yet; a 404 falls back to the
/// previous day. Failed probes are retried through `retry`.
pub async fn find_mirror<C: MirrorClient + ?Sized>(
    client: &C,
    archive_base: &str,
    today: NaiveDate,
    retry: &RetryExecutor,
) -> Result<String, RetriesExhausted<FetchError>> {
    let url = dated_mirror_url(archive_base, today);
    let published = retry
        .execute(&format!("probe of {}", url), || client.exists(&url))
        .await?;
    if published {
        return Ok(url);
    }

    let yesterday = today.pred_opt().unwrap_or(today);
    let fallback = dated_mirror_url(archive_base, yesterday);
    info!(missing = %url, fallback = %fallback, "Snapshot not published yet");
    Ok(fallback)
}
