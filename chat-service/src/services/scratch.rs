use service_core::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local directory used as per-request scratch space for uploads.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).await?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` under `name`. The file is removed when the returned guard
    /// drops.
    ///
    /// `name` must already be sanitized. Two requests storing the same name
    /// race on a single file.
    pub async fn store(&self, name: &str, data: &[u8]) -> Result<ScratchFile, AppError> {
        let path = self.root.join(name);

        if fs::try_exists(&path).await.unwrap_or(false) {
            tracing::warn!(
                filename = %name,
                "Scratch file already exists; a concurrent upload may be overwritten"
            );
        }

        // Guard first so a partial write is still cleaned up
        let file = ScratchFile { path };
        fs::write(&file.path, data).await.map_err(|e| {
            tracing::error!("Failed to write scratch file {}: {}", file.path.display(), e);
            AppError::from(e)
        })?;

        Ok(file)
    }
}

/// A stored upload. Dropping it deletes the file; failures are ignored.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "Scratch cleanup skipped");
        }
    }
}
