//! Harvest pipeline executor.
//!
//! This module provides the [`HarvestPipeline`] coordinator that runs one
//! bundle release end to end (Mirror → Database → Resolve → Download →
//! Archive → Generate → Upload) with:
//! - Async execution via `tokio`
//! - Bounded retries on every network operation
//! - Configurable timeouts per stage
//! - Structured logging via `tracing`
//! - Automatic cleanup of the staging directory via RAII (`Drop` on `StagingArea`)

use chrono::NaiveDate;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::checksum::write_checksum_file;
use crate::config::{bundle_file_name, package_archive_url, tlpdb_url, HarvestConfig, TLPDB_FILE};
use crate::executor::RetryExecutor;
use crate::harvest::database::parse_database;
use crate::harvest::formats::{release_generators, ContentsManifest};
use crate::harvest::resolver::resolve_packages;
use crate::harvest::traits::{DatabaseError, FileGenerator, GenerateError, ResolveError};
use crate::mirror::find_mirror;
use crate::model::ResolvedPackageSet;
use crate::traits::{
    ArchiveBuilder, ArchiveError, AssetUploader, FetchError, MirrorClient, UploadError,
};

// ============================================================================
// Pipeline Types
// ============================================================================

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Directory the package archives are downloaded into before bundling.
///
/// # RAII Cleanup
///
/// `StagingArea` implements [`Drop`] to remove the directory even on an
/// early return from an error path. It intentionally does **not** implement
/// `Clone`; clone `path` if you need to share it.
///
/// # Security
///
/// Package names come from the downloaded database. Use
/// [`StagingArea::safe_child`] to turn them into paths; it rejects anything
/// but a plain file name.
#[derive(Debug)]
pub struct StagingArea {
    /// Directory holding the staged files
    pub path: PathBuf,

    /// Whether to delete the directory on drop.
    pub(crate) cleanup_on_drop: bool,
}

impl StagingArea {
    /// Creates a fresh, uniquely named directory under `parent`.
    pub fn create(parent: &Path, prefix: &str, cleanup_on_drop: bool) -> std::io::Result<Self> {
        let path = parent.join(format!(
            "{}-{}-{}",
            prefix,
            std::process::id(),
            STAGING_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path)?;
        Ok(Self {
            path,
            cleanup_on_drop,
        })
    }

    /// Resolves `file_name` inside the staging directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::PathTraversal`] unless `file_name` is a
    /// single normal path component.
    pub fn safe_child(&self, file_name: &Path) -> Result<PathBuf, PipelineError> {
        let mut components = file_name.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.path.join(file_name)),
            _ => Err(PipelineError::PathTraversal {
                attempted: file_name.display().to_string(),
            }),
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.cleanup_on_drop && self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staging directory"
                );
            }
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct HarvestReport {
    /// Mirror every file was taken from
    pub mirror: String,

    /// The bundle archive
    pub archive: PathBuf,

    /// SHA-256 sidecar of the archive
    pub checksum: PathBuf,

    /// Generated configuration files, in generation order
    pub generated: Vec<PathBuf>,

    pub stats: HarvestStats,
}

/// Statistics about the run.
#[derive(Debug, Default, Clone)]
pub struct HarvestStats {
    /// Total time spent on the whole run (milliseconds)
    pub total_duration_ms: u64,

    /// Time spent downloading package archives (milliseconds)
    pub download_duration_ms: u64,

    /// Number of packages in the resolved set
    pub packages_resolved: usize,

    /// Number of package archives downloaded
    pub packages_downloaded: usize,

    /// Total size of downloaded archives (bytes)
    pub bytes_downloaded: u64,

    /// Number of generated configuration files
    pub files_generated: usize,
}

// ============================================================================
// Pipeline Errors
// ============================================================================

/// Errors that can occur during pipeline execution.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Mirror discovery kept failing until the attempt bound
    #[error("Mirror discovery failed after {attempts} attempts: {source}")]
    Mirror { attempts: u32, source: FetchError },

    /// A download kept failing until the attempt bound
    #[error("{url} can't be downloaded after {attempts} attempts: {source}")]
    Download {
        /// Stage the download belongs to (`database` or `download`)
        stage: &'static str,
        url: String,
        attempts: u32,
        source: FetchError,
    },

    /// The package database is malformed
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// The scheme references missing packages
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A derived file could not be generated
    #[error("Generation failed: {0}")]
    Generate(#[from] GenerateError),

    /// The bundle archive could not be built
    #[error("Archive creation failed: {0}")]
    Archive(#[from] ArchiveError),

    /// An upload kept failing until the attempt bound
    #[error("Upload of {} failed after {attempts} attempts: {source}", path.display())]
    Upload {
        path: PathBuf,
        attempts: u32,
        source: UploadError,
    },

    /// Stage execution exceeded timeout
    #[error("Stage '{stage}' timed out after {timeout_secs}s")]
    StageTimeout { stage: String, timeout_secs: u64 },

    /// A package name would escape the staging directory
    #[error("Path traversal attempt rejected: '{attempted}'")]
    PathTraversal { attempted: String },

    /// A blocking task panicked or was cancelled
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Name of the stage the error belongs to.
    pub fn stage(&self) -> &str {
        match self {
            PipelineError::Mirror { .. } => "mirror",
            PipelineError::Download { stage, .. } => stage,
            PipelineError::PathTraversal { .. } => "download",
            PipelineError::Database(_) => "database",
            PipelineError::Resolve(_) => "resolve",
            PipelineError::Generate(_) => "generate",
            PipelineError::Archive(_) => "archive",
            PipelineError::Upload { .. } => "upload",
            PipelineError::StageTimeout { stage, .. } => stage,
            PipelineError::TaskFailed(_) | PipelineError::Io(_) => "io",
        }
    }
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Release pipeline for one bundle.
///
/// The pipeline runs its stages strictly in sequence:
/// 1. **Mirror**: use the configured mirror or discover today's snapshot
/// 2. **Database**: fetch, save and parse `texlive.tlpdb`
/// 3. **Resolve**: compute the bundle's package set from its scheme
/// 4. **Download**: stage `CONTENTS` and every package archive
/// 5. **Archive**: build the bundle, its checksum, and upload both
/// 6. **Generate**: write and upload the derived configuration files
/// 7. **Cleanup**: remove the saved database
///
/// # Example
///
/// ```ignore
/// let config = HarvestConfig::new(PackageCollection::TexliveCore, "dist");
/// let pipeline = HarvestPipeline::new(config, mirror, TarArchiveBuilder::from_path()?, LocalUploader);
/// let report = pipeline.run().await?;
/// println!("Bundled {} packages", report.stats.packages_resolved);
/// ```
pub struct HarvestPipeline<M, A, U>
where
    M: MirrorClient,
    A: ArchiveBuilder,
    U: AssetUploader,
{
    config: HarvestConfig,

    mirror: M,

    archiver: A,

    uploader: U,

    retry: RetryExecutor,

    /// Date naming the bundle and selecting the snapshot
    today: NaiveDate,

    /// Parent of the staging directory (default: system temp dir)
    staging_root: PathBuf,
}

impl<M, A, U> HarvestPipeline<M, A, U>
where
    M: MirrorClient,
    A: ArchiveBuilder,
    U: AssetUploader,
{
    pub fn new(config: HarvestConfig, mirror: M, archiver: A, uploader: U) -> Self {
        let retry = RetryExecutor::new(config.max_attempts, config.retry_delay);
        Self {
            config,
            mirror,
            archiver,
            uploader,
            retry,
            today: chrono::Local::now().date_naive(),
            staging_root: std::env::temp_dir(),
        }
    }

    /// Overrides the run date.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Stages downloads under `root` instead of the system temp dir.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = root.into();
        self
    }

    /// Runs `work` under `limit`; `None` leaves the stage unbounded.
    async fn timed<T>(
        &self,
        stage: &str,
        limit: Option<Duration>,
        work: impl Future<Output = Result<T, PipelineError>>,
    ) -> Result<T, PipelineError> {
        let Some(limit) = limit else {
            return work.await;
        };
        timeout(limit, work)
            .await
            .map_err(|_| PipelineError::StageTimeout {
                stage: stage.to_string(),
                timeout_secs: limit.as_secs(),
            })?
    }

    /// Bounds one transfer attempt by the configured download timeout.
    async fn transfer<T>(
        &self,
        url: &str,
        work: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        let limit = self.config.download_timeout;
        timeout(limit, work).await.unwrap_or_else(|_| {
            Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_secs: limit.as_secs(),
            })
        })
    }

    async fn fetch_retrying(
        &self,
        stage: &'static str,
        url: &str,
    ) -> Result<Vec<u8>, PipelineError> {
        self.retry
            .execute(&format!("download of {}", url), || {
                self.transfer(url, self.mirror.fetch(url))
            })
            .await
            .map_err(|e| PipelineError::Download {
                stage,
                url: url.to_string(),
                attempts: e.attempts,
                source: e.last_error,
            })
    }

    async fn download_retrying(&self, url: &str, dest: &Path) -> Result<u64, PipelineError> {
        self.retry
            .execute(&format!("download of {}", url), || {
                self.transfer(url, self.mirror.download(url, dest))
            })
            .await
            .map_err(|e| PipelineError::Download {
                stage: "download",
                url: url.to_string(),
                attempts: e.attempts,
                source: e.last_error,
            })
    }

    async fn publish(&self, path: &Path) -> Result<(), PipelineError> {
        info!(path = %path.display(), "Uploading");
        self.retry
            .execute(&format!("upload of {}", path.display()), || {
                self.uploader.upload(path)
            })
            .await
            .map_err(|e| PipelineError::Upload {
                path: path.to_path_buf(),
                attempts: e.attempts,
                source: e.last_error,
            })
    }

    async fn select_mirror(&self) -> Result<String, PipelineError> {
        match &self.config.mirror {
            Some(mirror) => Ok(mirror.clone()),
            None => find_mirror(
                &self.mirror,
                &self.config.archive_mirror,
                self.today,
                &self.retry,
            )
            .await
            .map_err(|e| PipelineError::Mirror {
                attempts: e.attempts,
                source: e.last_error,
            }),
        }
    }

    /// Fetches the database into the output directory and resolves the scheme.
    async fn load_packages(
        &self,
        mirror: &str,
        tlpdb_path: &Path,
    ) -> Result<ResolvedPackageSet, PipelineError> {
        let raw = self.fetch_retrying("database", &tlpdb_url(mirror)).await?;
        tokio::fs::write(tlpdb_path, &raw).await?;
        info!(path = %tlpdb_path.display(), bytes = raw.len(), "Downloaded package database");

        let text = tokio::fs::read_to_string(tlpdb_path).await?;
        let scheme = self.config.scheme();
        info!(scheme, "Resolving scheme");

        tokio::task::spawn_blocking(move || -> Result<ResolvedPackageSet, PipelineError> {
            let database = parse_database(&text)?;
            Ok(resolve_packages(scheme, &database)?)
        })
        .await
        .map_err(|e| PipelineError::TaskFailed(e.to_string()))?
    }

    /// Stages `CONTENTS` and every package archive, then builds the bundle.
    async fn build_bundle(
        &self,
        mirror: &str,
        packages: &ResolvedPackageSet,
        archive: &Path,
        stats: &mut HarvestStats,
    ) -> Result<(), PipelineError> {
        let staging = StagingArea::create(
            &self.staging_root,
            self.config.package_name(),
            !self.config.keep_staging,
        )?;
        info!(path = %staging.path.display(), "Using staging directory");

        let contents = ContentsManifest::new(mirror);
        tokio::fs::write(
            staging.path.join(contents.file_name(self.config.package_name())),
            contents.render(packages)?,
        )
        .await?;

        let download_start = Instant::now();
        for name in packages.names() {
            let url = package_archive_url(mirror, name);
            let dest = staging.safe_child(Path::new(&format!("{}.tar.xz", name)))?;
            info!(package = %name, "Downloading");
            stats.bytes_downloaded += self.download_retrying(&url, &dest).await?;
            stats.packages_downloaded += 1;
        }
        stats.download_duration_ms = download_start.elapsed().as_millis() as u64;
        info!(
            duration_ms = stats.download_duration_ms,
            packages = stats.packages_downloaded,
            bytes = stats.bytes_downloaded,
            "Downloads completed"
        );

        self.archiver.build(&staging.path, archive).await?;
        Ok(())
    }

    async fn generate_files(
        &self,
        packages: &ResolvedPackageSet,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let mut written = Vec::new();
        for generator in release_generators() {
            let path = self
                .config
                .output_dir
                .join(generator.file_name(self.config.package_name()));
            info!(stage = generator.stage_name(), path = %path.display(), "Creating file");
            tokio::fs::write(&path, generator.render(packages)?).await?;
            info!(path = %path.display(), "Wrote file");
            self.publish(&path).await?;
            written.push(path);
        }
        Ok(written)
    }

    /// Runs the complete release.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] from the first failing stage. Files already
    /// written stay in place; the saved database is only removed on success.
    #[instrument(skip(self), fields(package = self.config.package_name()))]
    pub async fn run(&self) -> Result<HarvestReport, PipelineError> {
        let start = Instant::now();
        let mut stats = HarvestStats::default();
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        // ====================================================================
        // Stage 1: Mirror
        // ====================================================================

        let stage_timeout = Some(self.config.stage_timeout);
        let mirror = self
            .timed("mirror", stage_timeout, self.select_mirror())
            .await?;
        info!(mirror = %mirror, "Using mirror");

        // ====================================================================
        // Stages 2-3: Database and resolution
        // ====================================================================

        let tlpdb_path = self.config.output_dir.join(TLPDB_FILE);
        let packages = self
            .timed("database", stage_timeout, self.load_packages(&mirror, &tlpdb_path))
            .await?;
        stats.packages_resolved = packages.len();
        info!(packages = packages.len(), "Resolved package set");

        // ====================================================================
        // Stages 4-5: Download and archive
        // ====================================================================

        let archive = self
            .config
            .output_dir
            .join(bundle_file_name(self.config.package_name(), self.today));
        self.timed(
            "download",
            self.config.download_stage_timeout,
            self.build_bundle(&mirror, &packages, &archive, &mut stats),
        )
        .await?;

        let archive_for_hash = archive.clone();
        let checksum = tokio::task::spawn_blocking(move || write_checksum_file(&archive_for_hash))
            .await
            .map_err(|e| PipelineError::TaskFailed(e.to_string()))??;

        self.timed("upload", stage_timeout, async {
            self.publish(&archive).await?;
            self.publish(&checksum).await
        })
        .await?;

        // ====================================================================
        // Stage 6: Generated files
        // ====================================================================

        let generated = self
            .timed("generate", stage_timeout, self.generate_files(&packages))
            .await?;
        stats.files_generated = generated.len();

        // ====================================================================
        // Stage 7: Cleanup
        // ====================================================================

        info!("Cleaning up");
        tokio::fs::remove_file(&tlpdb_path).await?;

        stats.total_duration_ms = start.elapsed().as_millis() as u64;
        info!(duration_ms = stats.total_duration_ms, "Harvest completed");

        Ok(HarvestReport {
            mirror,
            archive,
            checksum,
            generated,
            stats,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
