use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("Request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archiver '{0}' not found in PATH")]
    ToolNotFound(String),
    #[error("Archiver exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Release '{0}' not found")]
    ReleaseNotFound(String),
    #[error("Upload of {path} rejected: {message}")]
    Rejected { path: String, message: String },
    #[error("Request failed: {0}")]
    Request(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Access to a TeX Live mirror.
#[async_trait]
pub trait MirrorClient: Send + Sync {
    /// Returns the body of `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Streams `url` into `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;

    /// Whether `url` answers with something other than 404.
    async fn exists(&self, url: &str) -> Result<bool, FetchError>;
}

/// Packs a directory of downloaded package archives into one bundle.
#[async_trait]
pub trait ArchiveBuilder: Send + Sync {
    async fn build(&self, source_dir: &Path, output: &Path) -> Result<(), ArchiveError>;
}

/// Publishes a file as a release asset.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<(), UploadError>;
}

#[async_trait]
impl<T: AssetUploader + ?Sized> AssetUploader for Box<T> {
    async fn upload(&self, path: &Path) -> Result<(), UploadError> {
        (**self).upload(path).await
    }
}
