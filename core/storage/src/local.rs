//! Local filesystem snapshot transport.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use marksync_common::{Error, RemotePath, Result};

use crate::transport::{Entry, SnapshotTransport};

/// Snapshot transport backed by a local directory.
///
/// Stands in for a mounted or synced remote; also convenient for offline
/// use. Constructed from an explicit root path.
pub struct LocalDirTransport {
    root: PathBuf,
}

impl LocalDirTransport {
    /// Create a new local transport rooted at the given directory.
    ///
    /// # Postconditions
    /// - Root directory is created if it doesn't exist
    ///
    /// # Errors
    /// - Invalid path
    /// - Permission denied
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }

        Ok(Self { root })
    }

    fn to_fs_path(&self, path: &RemotePath) -> PathBuf {
        let mut fs_path = self.root.clone();
        for component in path.components() {
            fs_path.push(component);
        }
        fs_path
    }

    fn entry_from_fs(&self, path: &RemotePath, fs_meta: std::fs::Metadata) -> Entry {
        let modified: DateTime<Utc> = fs_meta
            .modified()
            .map(|t| t.into())
            .unwrap_or_else(|_| Utc::now());

        Entry {
            name: path.name().unwrap_or("/").to_string(),
            path: path.clone(),
            size: if fs_meta.is_file() {
                Some(fs_meta.len())
            } else {
                None
            },
            is_directory: fs_meta.is_dir(),
            modified,
        }
    }
}

#[async_trait]
impl SnapshotTransport for LocalDirTransport {
    fn name(&self) -> &str {
        "localdir"
    }

    async fn write(&self, path: &RemotePath, data: Vec<u8>) -> Result<Entry> {
        let fs_path = self.to_fs_path(path);

        if let Some(parent) = fs_path.parent() {
            if !parent.exists() {
                return Err(Error::NotFound("Parent directory not found".to_string()));
            }
        }

        debug!("writing {} bytes to {}", data.len(), path);
        fs::write(&fs_path, &data).await?;

        let fs_meta = fs::metadata(&fs_path).await?;
        Ok(self.entry_from_fs(path, fs_meta))
    }

    async fn read(&self, path: &RemotePath) -> Result<Vec<u8>> {
        let fs_path = self.to_fs_path(path);

        if !fs_path.exists() {
            return Err(Error::NotFound(format!("File not found: {}", path)));
        }
        if fs_path.is_dir() {
            return Err(Error::InvalidInput("Cannot read a directory".to_string()));
        }

        Ok(fs::read(&fs_path).await?)
    }

    async fn list(&self, dir: &RemotePath) -> Result<Vec<Entry>> {
        let fs_path = self.to_fs_path(dir);

        if !fs_path.exists() {
            return Err(Error::NotFound(format!("Directory not found: {}", dir)));
        }
        if !fs_path.is_dir() {
            return Err(Error::InvalidInput("Not a directory".to_string()));
        }

        let mut results = Vec::new();
        let mut entries = fs::read_dir(&fs_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry
                .path()
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string();

            let child_path = dir.join(&name)?;
            let fs_meta = entry.metadata().await?;
            results.push(self.entry_from_fs(&child_path, fs_meta));
        }

        Ok(results)
    }

    async fn remove(&self, path: &RemotePath) -> Result<()> {
        let fs_path = self.to_fs_path(path);

        if !fs_path.exists() {
            return Err(Error::NotFound(format!("File not found: {}", path)));
        }
        if fs_path.is_dir() {
            return Err(Error::InvalidInput("Cannot remove a directory".to_string()));
        }

        fs::remove_file(&fs_path).await?;
        Ok(())
    }

    async fn ensure_directory(&self, path: &RemotePath) -> Result<()> {
        let fs_path = self.to_fs_path(path);

        if fs_path.is_file() {
            return Err(Error::InvalidInput(format!(
                "Path exists as a file: {}",
                path
            )));
        }

        // create_dir_all succeeds when the directory already exists.
        fs::create_dir_all(&fs_path).await?;
        Ok(())
    }
}
