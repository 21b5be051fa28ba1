//! Bundle creation through the system `tar`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::traits::{ArchiveBuilder, ArchiveError};

/// Builds `.tar.xz` bundles with a flat layout: every regular file of the
/// source directory sits at the archive root.
#[derive(Debug, Clone)]
pub struct TarArchiveBuilder {
    tar: PathBuf,
}

impl TarArchiveBuilder {
    /// Locates `tar` in `PATH`.
    pub fn from_path() -> Result<Self, ArchiveError> {
        let tar = which::which("tar").map_err(|_| ArchiveError::ToolNotFound("tar".to_string()))?;
        Ok(Self { tar })
    }

    pub fn with_binary(tar: impl Into<PathBuf>) -> Self {
        Self { tar: tar.into() }
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub async fn archive_members(dir: &Path) -> Result<Vec<String>, std::io::Error> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut members = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            members.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    members.sort();
    Ok(members)
}

#[async_trait]
impl ArchiveBuilder for TarArchiveBuilder {
    async fn build(&self, source_dir: &Path, output: &Path) -> Result<(), ArchiveError> {
        let members = archive_members(source_dir).await?;
        let output = std::path::absolute(output)?;
        info!(files = members.len(), output = %output.display(), "Creating tar archive");

        let result = Command::new(&self.tar)
            .arg("-cJf")
            .arg(&output)
            .arg("-C")
            .arg(source_dir)
            .arg("--")
            .args(&members)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !result.status.success() {
            return Err(ArchiveError::Failed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        debug!(output = %output.display(), "Archive written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_archive_members_lists_files_only_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.tar.xz"), b"b").unwrap();
        std::fs::write(dir.path().join("CONTENTS"), b"c").unwrap();
        std::fs::write(dir.path().join("a.tar.xz"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let members = archive_members(dir.path()).await.unwrap();
        assert_eq!(members, vec!["CONTENTS", "a.tar.xz", "b.tar.xz"]);
    }

    #[tokio::test]
    async fn test_build_writes_flat_xz_archive() {
        let Ok(builder) = TarArchiveBuilder::from_path() else {
            eprintln!("tar not found, skipping");
            return;
        };
        if which::which("xz").is_err() {
            eprintln!("xz not found, skipping");
            return;
        }

        let source = tempfile::tempdir().unwrap();
        std::fs::write(source.path().join("CONTENTS"), b"# header\n").unwrap();
        std::fs::write(source.path().join("amsfonts.tar.xz"), b"amsfonts").unwrap();
        std::fs::write(source.path().join("tex.tar.xz"), b"tex").unwrap();
        std::fs::create_dir(source.path().join("nested")).unwrap();
        std::fs::write(source.path().join("nested").join("skipped"), b"x").unwrap();

        let out = tempfile::tempdir().unwrap();
        let bundle = out.path().join("texlive-core-20240601.tar.xz");
        builder.build(source.path(), &bundle).await.unwrap();

        let listing = std::process::Command::new("tar")
            .arg("-tJf")
            .arg(&bundle)
            .output()
            .unwrap();
        assert!(listing.status.success());
        let mut members: Vec<String> = String::from_utf8_lossy(&listing.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        members.sort();
        assert_eq!(members, vec!["CONTENTS", "amsfonts.tar.xz", "tex.tar.xz"]);
    }

    #[tokio::test]
    async fn test_missing_binary_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), b"a").unwrap();
        let builder = TarArchiveBuilder::with_binary("/nonexistent/tar-binary");

        let result = builder.build(dir.path(), &dir.path().join("out.tar.xz")).await;
        assert!(matches!(result, Err(ArchiveError::IoError(_))));
    }
}
