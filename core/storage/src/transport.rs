//! Snapshot transport trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marksync_common::{RemotePath, Result};

/// Metadata for a stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Name of the object (last path component).
    pub name: String,
    /// Full remote path of the object.
    pub path: RemotePath,
    /// Size in bytes (None for directories).
    pub size: Option<u64>,
    /// Whether this is a directory.
    pub is_directory: bool,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// Transport to a remote snapshot store.
///
/// Implementations adapt a concrete backend (WebDAV server, local directory,
/// memory). All operations are async; implementations handle their own
/// authentication and connection management and are constructed from an
/// explicit configuration value, never from ambient shared state.
#[async_trait]
pub trait SnapshotTransport: Send + Sync {
    /// Get the transport name (e.g., "memory", "localdir").
    fn name(&self) -> &str;

    /// Write a complete object.
    ///
    /// # Preconditions
    /// - Parent directory must exist
    ///
    /// # Postconditions
    /// - Object is created or replaced at the given path
    ///
    /// # Errors
    /// - Parent directory not found
    /// - Network/I/O errors
    async fn write(&self, path: &RemotePath, data: Vec<u8>) -> Result<Entry>;

    /// Read a complete object.
    ///
    /// # Errors
    /// - Object not found
    /// - Network/I/O errors
    async fn read(&self, path: &RemotePath) -> Result<Vec<u8>>;

    /// List the direct children of a directory.
    ///
    /// # Errors
    /// - Directory not found (`Error::NotFound`); callers listing a backup
    ///   directory treat this as "no backups yet", not a failure
    async fn list(&self, dir: &RemotePath) -> Result<Vec<Entry>>;

    /// Remove an object.
    ///
    /// # Errors
    /// - Object not found
    /// - Path is a directory
    async fn remove(&self, path: &RemotePath) -> Result<()>;

    /// Create a directory if it does not already exist.
    ///
    /// Idempotent: an existing directory is success. Backends whose create
    /// call rejects an existing directory (WebDAV answers MKCOL with 405)
    /// must map that answer to success here.
    ///
    /// # Errors
    /// - Path exists as a file
    /// - Network/I/O errors
    async fn ensure_directory(&self, path: &RemotePath) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serialization() {
        let entry = Entry {
            name: "bookmarks_2025-01-15_143052.json".to_string(),
            path: RemotePath::parse("/bookmark-sync/bookmarks_2025-01-15_143052.json").unwrap(),
            size: Some(1024),
            is_directory: false,
            modified: Utc::now(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: Entry = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.name, entry.name);
        assert_eq!(deserialized.size, entry.size);
        assert!(!deserialized.is_directory);
    }
}
