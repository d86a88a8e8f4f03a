//! Remote snapshot file management.
//!
//! Snapshots live as immutable, timestamp-named JSON files inside one
//! directory on the remote store. Nothing is ever overwritten: each backup
//! writes a new file, and "latest" is the entry with the greatest
//! modification time.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use marksync_bookmarks::{SnapshotDocument, TreeNode};
use marksync_common::{Error, RemotePath, Result};
use marksync_storage::SnapshotTransport;

/// Directory on the remote store holding snapshot files.
pub const DEFAULT_SYNC_DIR: &str = "bookmark-sync";

const FILE_PREFIX: &str = "bookmarks_";
const FILE_SUFFIX: &str = ".json";

/// Remote-side configuration, passed by value into each snapshot store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Directory for snapshot files, relative to the transport root.
    pub directory: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_SYNC_DIR.to_string(),
        }
    }
}

/// One entry in the remote backup listing.
#[derive(Debug, Clone)]
pub struct BackupRecord {
    pub name: String,
    pub path: RemotePath,
    pub last_modified: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Generate the file name for a backup captured at the given instant.
///
/// `bookmarks_<YYYY-MM-DD>_<HHMMSS>.json`, lexicographically sortable by
/// capture time.
pub fn backup_file_name(at: DateTime<Utc>) -> String {
    format!(
        "{}{}_{}{}",
        FILE_PREFIX,
        at.format("%Y-%m-%d"),
        at.format("%H%M%S"),
        FILE_SUFFIX
    )
}

/// Order records newest first. The name is capture-time ordered and breaks
/// ties between equal modification timestamps.
fn sort_newest_first(backups: &mut [BackupRecord]) {
    backups.sort_by(|a, b| (b.last_modified, &b.name).cmp(&(a.last_modified, &a.name)));
}

/// Snapshot file store over an abstract transport.
pub struct SnapshotStore<T: SnapshotTransport + ?Sized> {
    transport: Arc<T>,
    config: RemoteConfig,
}

impl<T: SnapshotTransport + ?Sized> SnapshotStore<T> {
    pub fn new(transport: Arc<T>, config: RemoteConfig) -> Self {
        Self { transport, config }
    }

    fn dir_path(&self) -> Result<RemotePath> {
        RemotePath::parse(&self.config.directory)
    }

    fn file_path(&self, name: &str) -> Result<RemotePath> {
        self.dir_path()?.join(name)
    }

    /// Write a captured forest as a new snapshot file.
    ///
    /// Returns the generated file name. Transport failures propagate
    /// unchanged; there are no retries here.
    pub async fn write_snapshot(&self, forest: Vec<TreeNode>) -> Result<String> {
        let captured_at = Utc::now();
        let name = backup_file_name(captured_at);
        let document = SnapshotDocument::new(forest, name.clone(), captured_at);
        let bytes = document.to_bytes()?;

        self.transport.ensure_directory(&self.dir_path()?).await?;
        let path = self.file_path(&name)?;
        debug!("uploading snapshot to {}", path);
        self.transport.write(&path, bytes).await?;
        info!("snapshot written: {}", name);

        Ok(name)
    }

    /// List snapshot files, newest first.
    ///
    /// A missing backup directory means no backups yet and yields an empty
    /// list. Entries that are not `bookmarks_*.json` files are ignored.
    pub async fn list_backups(&self) -> Result<Vec<BackupRecord>> {
        let entries = match self.transport.list(&self.dir_path()?).await {
            Ok(entries) => entries,
            Err(Error::NotFound(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut backups: Vec<BackupRecord> = entries
            .into_iter()
            .filter(|entry| {
                !entry.is_directory
                    && entry.name.starts_with(FILE_PREFIX)
                    && entry.name.ends_with(FILE_SUFFIX)
            })
            .map(|entry| BackupRecord {
                name: entry.name,
                path: entry.path,
                last_modified: entry.modified,
                size_bytes: entry.size.unwrap_or(0),
            })
            .collect();

        sort_newest_first(&mut backups);
        Ok(backups)
    }

    /// Whether any snapshot exists; listing failures read as "no".
    pub async fn has_backups(&self) -> bool {
        self.list_backups()
            .await
            .map(|backups| !backups.is_empty())
            .unwrap_or(false)
    }

    /// Read and parse one snapshot file by name.
    pub async fn read_snapshot(&self, name: &str) -> Result<SnapshotDocument> {
        let bytes = self.transport.read(&self.file_path(name)?).await?;
        SnapshotDocument::from_bytes(&bytes)
    }

    /// Read the newest snapshot, if any exists.
    pub async fn read_latest(&self) -> Result<Option<SnapshotDocument>> {
        let backups = self.list_backups().await?;
        match backups.first() {
            Some(latest) => Ok(Some(self.read_snapshot(&latest.name).await?)),
            None => Ok(None),
        }
    }

    /// Delete one snapshot file by name.
    pub async fn delete_backup(&self, name: &str) -> Result<()> {
        info!("deleting backup {}", name);
        self.transport.remove(&self.file_path(name)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use marksync_storage::MemoryTransport;

    fn store() -> SnapshotStore<MemoryTransport> {
        SnapshotStore::new(Arc::new(MemoryTransport::new()), RemoteConfig::default())
    }

    #[test]
    fn test_backup_file_name_format() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 52).unwrap();
        assert_eq!(backup_file_name(at), "bookmarks_2025-01-15_143052.json");
    }

    #[tokio::test]
    async fn test_write_then_list_and_read() {
        let store = store();
        let name = store.write_snapshot(Vec::new()).await.unwrap();

        let backups = store.list_backups().await.unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].name, name);
        assert!(backups[0].size_bytes > 0);

        let doc = store.read_snapshot(&name).await.unwrap();
        assert!(doc.is_supported());
        assert_eq!(doc.file_name, name);
    }

    #[tokio::test]
    async fn test_list_with_no_directory_is_empty() {
        let store = store();
        assert!(store.list_backups().await.unwrap().is_empty());
        assert!(!store.has_backups().await);
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_files() {
        let transport = Arc::new(MemoryTransport::new());
        let store = SnapshotStore::new(transport.clone(), RemoteConfig::default());
        store.write_snapshot(Vec::new()).await.unwrap();

        let dir = RemotePath::parse(DEFAULT_SYNC_DIR).unwrap();
        transport
            .write(&dir.join("notes.txt").unwrap(), vec![1])
            .await
            .unwrap();
        transport
            .write(&dir.join("bookmarks_backup.zip").unwrap(), vec![2])
            .await
            .unwrap();

        let backups = store.list_backups().await.unwrap();
        assert_eq!(backups.len(), 1);
    }

    #[tokio::test]
    async fn test_latest_is_most_recent_write() {
        let store = store();
        store.write_snapshot(Vec::new()).await.unwrap();
        let second = store
            .write_snapshot(vec![TreeNode {
                id: String::new(),
                title: "Bookmarks bar".to_string(),
                url: None,
                date_added: 0,
                date_modified: 0,
                index: 0,
                children: None,
            }])
            .await
            .unwrap();

        // Same-second writes share a file name, so latest is the second
        // capture either way.
        let latest = store.read_latest().await.unwrap().unwrap();
        assert_eq!(latest.file_name, second);
        assert_eq!(latest.into_forest().len(), 1);
    }

    #[test]
    fn test_sort_prefers_newest_name_on_equal_mtime() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
        let record = |name: &str, modified| BackupRecord {
            name: name.to_string(),
            path: RemotePath::parse(DEFAULT_SYNC_DIR).unwrap().join(name).unwrap(),
            last_modified: modified,
            size_bytes: 10,
        };

        let mut backups = vec![
            record("bookmarks_2025-01-15_080000.json", at),
            record("bookmarks_2025-01-15_090000.json", at),
            record(
                "bookmarks_2025-01-14_235959.json",
                Utc.with_ymd_and_hms(2025, 1, 14, 23, 59, 59).unwrap(),
            ),
        ];
        sort_newest_first(&mut backups);

        assert_eq!(backups[0].name, "bookmarks_2025-01-15_090000.json");
        assert_eq!(backups[2].name, "bookmarks_2025-01-14_235959.json");
    }

    #[tokio::test]
    async fn test_delete_backup() {
        let store = store();
        let name = store.write_snapshot(Vec::new()).await.unwrap();

        store.delete_backup(&name).await.unwrap();
        assert!(store.list_backups().await.unwrap().is_empty());
        assert!(store.delete_backup(&name).await.is_err());
    }

    #[tokio::test]
    async fn test_read_latest_none_when_empty() {
        let store = store();
        assert!(store.read_latest().await.unwrap().is_none());
    }
}
