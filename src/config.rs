//! Run configuration and mirror layout.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

use crate::executor::DEFAULT_MAX_ATTEMPTS;

/// Root of the daily TeX Live snapshots.
pub const DEFAULT_ARCHIVE_MIRROR: &str = "https://texlive.info/tlnet-archive/";

/// File name the database is saved under while a run is in progress.
pub const TLPDB_FILE: &str = "texlive.tlpdb";

/// Bundles that can be published, each rooted at a TeX Live scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PackageCollection {
    #[value(name = "texlive-core")]
    TexliveCore,
    #[value(name = "texlive-basic")]
    TexliveBasic,
    #[value(name = "texlive-full")]
    TexliveFull,
}

impl PackageCollection {
    pub fn package_name(self) -> &'static str {
        match self {
            PackageCollection::TexliveCore => "texlive-core",
            PackageCollection::TexliveBasic => "texlive-basic",
            PackageCollection::TexliveFull => "texlive-full",
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            PackageCollection::TexliveCore => "scheme-medium",
            PackageCollection::TexliveBasic => "scheme-basic",
            PackageCollection::TexliveFull => "scheme-full",
        }
    }
}

pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// `{base}YYYY/MM/DD/tlnet/`
pub fn dated_mirror_url(base: &str, date: NaiveDate) -> String {
    format!(
        "{}{}/tlnet/",
        ensure_trailing_slash(base),
        date.format("%Y/%m/%d")
    )
}

pub fn tlpdb_url(mirror: &str) -> String {
    format!("{}tlpkg/{}", ensure_trailing_slash(mirror), TLPDB_FILE)
}

pub fn package_archive_url(mirror: &str, package: &str) -> String {
    format!("{}archive/{}.tar.xz", ensure_trailing_slash(mirror), package)
}

/// `{package}-YYYYMMDD.tar.xz`
pub fn bundle_file_name(package: &str, date: NaiveDate) -> String {
    format!("{}-{}.tar.xz", package, date.format("%Y%m%d"))
}

/// Configuration of one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub collection: PackageCollection,
    pub output_dir: PathBuf,
    /// Fixed mirror; discovered from `archive_mirror` when `None`
    pub mirror: Option<String>,
    pub archive_mirror: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    /// Connect and read-idle timeout of a single request
    pub request_timeout: Duration,
    /// Cap on one whole transfer attempt, body included
    pub download_timeout: Duration,
    pub stage_timeout: Duration,
    /// Cap on the whole package download stage; unbounded when `None`
    pub download_stage_timeout: Option<Duration>,
    pub keep_staging: bool,
}

impl HarvestConfig {
    /// Default configuration:
    /// - Mirror: today's snapshot under [`DEFAULT_ARCHIVE_MIRROR`]
    /// - Attempts: 10 per download, 2s apart
    /// - Timeouts: 5 minutes without progress on a request, 1 hour per
    ///   transfer, 1 hour per stage except the package downloads
    pub fn new(collection: PackageCollection, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            collection,
            output_dir: output_dir.into(),
            mirror: None,
            archive_mirror: DEFAULT_ARCHIVE_MIRROR.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(300),
            download_timeout: Duration::from_secs(3600),
            stage_timeout: Duration::from_secs(3600),
            download_stage_timeout: None,
            keep_staging: false,
        }
    }

    pub fn with_mirror(mut self, mirror: impl Into<String>) -> Self {
        self.mirror = Some(ensure_trailing_slash(&mirror.into()));
        self
    }

    pub fn with_archive_mirror(mut self, base: impl Into<String>) -> Self {
        self.archive_mirror = ensure_trailing_slash(&base.into());
        self
    }

    pub fn with_retries(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn with_download_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.download_stage_timeout = timeout;
        self
    }

    pub fn with_keep_staging(mut self, keep: bool) -> Self {
        self.keep_staging = keep;
        self
    }

    pub fn package_name(&self) -> &'static str {
        self.collection.package_name()
    }

    pub fn scheme(&self) -> &'static str {
        self.collection.scheme()
    }
}
