//! tlpdb-harvester CLI entry point
//!
//! Resolves a TeX Live scheme, bundles its package archives and publishes the
//! bundle with its generated `.fmts`, `.maps` and hyphenation files.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tlpdb_harvester::archive::TarArchiveBuilder;
use tlpdb_harvester::harvest::HarvestPipeline;
use tlpdb_harvester::mirror::ReqwestMirrorClient;
use tlpdb_harvester::upload::{GithubReleaseUploader, LocalUploader};
use tlpdb_harvester::{
    AssetUploader, HarvestConfig, PackageCollection, DEFAULT_ARCHIVE_MIRROR, DEFAULT_MAX_ATTEMPTS,
};

/// Prepare TeX Live archives.
#[derive(Parser, Debug)]
#[command(name = "tlpdb-harvester", version, about)]
struct Cli {
    /// The package to build.
    #[arg(value_enum)]
    package: PackageCollection,

    /// The directory to save files.
    directory: PathBuf,

    /// Use this mirror instead of today's snapshot.
    #[arg(long, env = "TLPDB_MIRROR")]
    mirror: Option<String>,

    /// Root of the dated snapshots searched when no mirror is given.
    #[arg(long, default_value = DEFAULT_ARCHIVE_MIRROR)]
    archive_mirror: String,

    /// Abort a stage that runs longer than this many seconds.
    #[arg(long, default_value_t = 3600)]
    stage_timeout_secs: u64,

    /// Cap on the whole package download stage (unbounded by default).
    #[arg(long)]
    download_stage_timeout_secs: Option<u64>,

    /// Give up on a single transfer attempt after this many seconds.
    #[arg(long, default_value_t = 3600)]
    download_timeout_secs: u64,

    /// Attempts per download or upload before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Seconds to wait between attempts.
    #[arg(long, default_value_t = 2)]
    retry_delay_secs: u64,

    /// Keep generated files locally instead of publishing them.
    #[arg(long)]
    no_upload: bool,

    /// Do not delete the staging directory.
    #[arg(long)]
    keep_staging: bool,

    /// Repository (`owner/name`) whose release receives the assets.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Tag of the release receiving the assets.
    #[arg(long, env = "RELEASE_TAG")]
    tag: Option<String>,

    /// Token used for uploads.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn init_logging(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("warn")
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new("info")
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }

    fn config(&self) -> HarvestConfig {
        let mut config = HarvestConfig::new(self.package, &self.directory)
            .with_retries(self.max_attempts, Duration::from_secs(self.retry_delay_secs))
            .with_archive_mirror(self.archive_mirror.as_str())
            .with_stage_timeout(Duration::from_secs(self.stage_timeout_secs))
            .with_download_stage_timeout(self.download_stage_timeout_secs.map(Duration::from_secs))
            .with_download_timeout(Duration::from_secs(self.download_timeout_secs))
            .with_keep_staging(self.keep_staging);
        if let Some(mirror) = &self.mirror {
            config = config.with_mirror(mirror.as_str());
        }
        config
    }

    fn uploader(&self) -> Result<Box<dyn AssetUploader>> {
        if self.no_upload {
            return Ok(Box::new(LocalUploader));
        }
        let (Some(repository), Some(tag), Some(token)) = (&self.repository, &self.tag, &self.token)
        else {
            bail!("uploading needs --repository, --tag and --token (or pass --no-upload)");
        };
        Ok(Box::new(GithubReleaseUploader::new(
            repository.as_str(),
            tag.as_str(),
            token.as_str(),
        )?))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    info!("Starting...");
    info!("Package: {}", cli.package.package_name());
    info!("Directory: {}", cli.directory.display());

    let config = cli.config();
    let mirror = ReqwestMirrorClient::new(config.request_timeout)
        .context("Failed to set up mirror client")?;
    let archiver = TarArchiveBuilder::from_path().context("Failed to set up archiver")?;
    let uploader = cli.uploader()?;

    let pipeline = HarvestPipeline::new(config, mirror, archiver, uploader);
    match pipeline.run().await {
        Ok(report) => {
            info!(
                archive = %report.archive.display(),
                packages = report.stats.packages_resolved,
                bytes = report.stats.bytes_downloaded,
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            error!(stage = e.stage(), "{}", e);
            std::process::exit(1);
        }
    }
}
