//! Release asset publishing.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::traits::{AssetUploader, UploadError};

const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct Release {
    upload_url: String,
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

fn file_name(path: &Path) -> Result<String, UploadError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| UploadError::Rejected {
            path: path.display().to_string(),
            message: "path has no file name".to_string(),
        })
}

/// Strips the URI template suffix (`{?name,label}`) GitHub appends.
fn upload_endpoint(upload_url: &str) -> &str {
    upload_url.split('{').next().unwrap_or(upload_url)
}

/// Uploads assets to an existing GitHub release, replacing any asset that
/// already has the same name.
#[derive(Debug, Clone)]
pub struct GithubReleaseUploader {
    client: reqwest::Client,
    api_base: String,
    repository: String,
    tag: String,
    token: String,
}

impl GithubReleaseUploader {
    pub fn new(
        repository: impl Into<String>,
        tag: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UploadError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: GITHUB_API.to_string(),
            repository: repository.into(),
            tag: tag.into(),
            token: token.into(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    async fn send(&self, builder: reqwest::RequestBuilder, path: &Path) -> Result<Vec<u8>, UploadError> {
        let response = builder
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        if status.is_success() {
            return Ok(body.to_vec());
        }
        let message = serde_json::from_slice::<ApiMessage>(&body)
            .map(|api| api.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        Err(UploadError::Rejected {
            path: path.display().to_string(),
            message: format!("HTTP {}: {}", status, message),
        })
    }

    async fn release(&self, path: &Path) -> Result<Release, UploadError> {
        let url = format!(
            "{}/repos/{}/releases/tags/{}",
            self.api_base, self.repository, self.tag
        );
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(UploadError::ReleaseNotFound(self.tag.clone()));
        }
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(UploadError::Rejected {
                path: path.display().to_string(),
                message: format!("HTTP {} while looking up release {}", status, self.tag),
            });
        }
        serde_json::from_slice(&body).map_err(|e| UploadError::Request(e.to_string()))
    }
}

#[async_trait]
impl AssetUploader for GithubReleaseUploader {
    async fn upload(&self, path: &Path) -> Result<(), UploadError> {
        let name = file_name(path)?;
        let release = self.release(path).await?;

        for asset in release.assets.iter().filter(|asset| asset.name == name) {
            debug!(asset = %asset.name, id = asset.id, "Replacing existing asset");
            let url = format!(
                "{}/repos/{}/releases/assets/{}",
                self.api_base, self.repository, asset.id
            );
            self.send(self.request(reqwest::Method::DELETE, &url), path).await?;
        }

        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let builder = self
            .request(reqwest::Method::POST, upload_endpoint(&release.upload_url))
            .query(&[("name", name.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)));
        self.send(builder, path).await?;

        info!(asset = %name, bytes = size, tag = %self.tag, "Uploaded release asset");
        Ok(())
    }
}

/// Leaves files where they were written.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalUploader;

#[async_trait]
impl AssetUploader for LocalUploader {
    async fn upload(&self, path: &Path) -> Result<(), UploadError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(UploadError::Rejected {
                path: path.display().to_string(),
                message: "file does not exist".to_string(),
            });
        }
        info!(path = %path.display(), "Upload disabled, keeping local file");
        Ok(())
    }
}
