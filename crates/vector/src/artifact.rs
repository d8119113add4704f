use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uiforge_common::{AppConfig, Result, UiForgeError};

/// Locations of the two persisted knowledge-base files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub index: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn new(index: impl Into<PathBuf>, metadata: impl Into<PathBuf>) -> Self {
        Self {
            index: index.into(),
            metadata: metadata.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.index_path, &config.metadata_path)
    }

    /// Both files present
    pub fn exist(&self) -> bool {
        self.index.exists() && self.metadata.exists()
    }
}

/// Sibling path used while a file is being written
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Previous version kept while a new pair is swapped in
pub(crate) fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Write `bytes` next to `path` and flush; the target is untouched until `commit_file`
pub(crate) async fn stage_file(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let staged = temp_path(path);
    let mut file = tokio::fs::File::create(&staged).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(staged)
}

/// Move a staged file over its target
pub(crate) async fn commit_file(staged: &Path, path: &Path) -> Result<()> {
    tokio::fs::rename(staged, path).await?;
    Ok(())
}

/// Remove a file that may or may not exist, logging failures
pub(crate) async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

/// Replace both artifacts with their staged versions
///
/// Metadata is committed first. The previous metadata is held at `<path>.bak`
/// until the index rename succeeds; if it fails, the previous metadata is put
/// back so the pair on disk never mixes generations. Staged files are removed
/// on every failure path.
pub(crate) async fn commit_pair(
    paths: &ArtifactPaths,
    staged_metadata: &Path,
    staged_index: &Path,
) -> Result<()> {
    let backup = backup_path(&paths.metadata);
    let had_previous = tokio::fs::try_exists(&paths.metadata).await?;

    if had_previous {
        if let Err(e) = tokio::fs::rename(&paths.metadata, &backup).await {
            discard(staged_metadata).await;
            discard(staged_index).await;
            return Err(e.into());
        }
    }

    if let Err(e) = commit_file(staged_metadata, &paths.metadata).await {
        restore_metadata(paths, &backup, had_previous).await;
        discard(staged_metadata).await;
        discard(staged_index).await;
        return Err(e);
    }

    if let Err(e) = commit_file(staged_index, &paths.index).await {
        warn!(
            "Failed to replace {}, restoring previous metadata",
            paths.index.display()
        );
        restore_metadata(paths, &backup, had_previous).await;
        discard(staged_index).await;
        return Err(e);
    }

    discard(&backup).await;
    Ok(())
}

async fn restore_metadata(paths: &ArtifactPaths, backup: &Path, had_previous: bool) {
    if had_previous {
        if let Err(e) = tokio::fs::rename(backup, &paths.metadata).await {
            warn!(
                "Failed to restore {} from {}: {}",
                paths.metadata.display(),
                backup.display(),
                e
            );
        }
    } else {
        discard(&paths.metadata).await;
    }
}

/// Stage then commit in one go
pub(crate) async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let staged = stage_file(path, bytes).await?;
    commit_file(&staged, path).await
}

/// Read a whole artifact, mapping absence to `MissingArtifact`
pub(crate) async fn read_file(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(UiForgeError::missing_artifact(path))
        }
        Err(e) => Err(e.into()),
    }
}
