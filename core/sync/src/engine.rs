//! Sync orchestration: backup and restore round trips.

use std::sync::Arc;
use tracing::{info, warn};

use marksync_bookmarks::{parse_forest, BookmarkStore};
use marksync_common::Result;
use marksync_storage::SnapshotTransport;

use crate::backups::{BackupRecord, RemoteConfig, SnapshotStore};
use crate::reconcile::{restore_forest, RestoreMode, RestoreReport};

/// Coordinates the local bookmark store and the remote snapshot store.
///
/// The engine holds no state beyond its two collaborators; each operation is
/// a full pass. Callers must not run two operations against the same store
/// concurrently.
pub struct SyncEngine<S, T>
where
    S: BookmarkStore + ?Sized,
    T: SnapshotTransport + ?Sized,
{
    store: Arc<S>,
    snapshots: SnapshotStore<T>,
}

impl<S, T> SyncEngine<S, T>
where
    S: BookmarkStore + ?Sized,
    T: SnapshotTransport + ?Sized,
{
    /// Create a new engine over a local store and a remote transport.
    pub fn new(store: Arc<S>, transport: Arc<T>, config: RemoteConfig) -> Self {
        Self {
            store,
            snapshots: SnapshotStore::new(transport, config),
        }
    }

    /// Capture the full local forest and write it as a new snapshot.
    ///
    /// Returns the generated file name. Transport failures propagate; the
    /// external scheduler decides whether to retry.
    pub async fn backup(&self) -> Result<String> {
        info!("starting backup");
        let forest = self.store.tree().await?;
        info!("captured {} top-level roots", forest.len());
        let name = self.snapshots.write_snapshot(forest).await?;
        info!("backup complete: {}", name);
        Ok(name)
    }

    /// Merge a snapshot into the local store.
    ///
    /// With no name, the newest backup is used; an empty remote yields a
    /// zero report rather than an error, as do legacy and unsupported
    /// snapshot formats.
    pub async fn restore(&self, name: Option<&str>, mode: RestoreMode) -> Result<RestoreReport> {
        info!(
            "starting restore from {} (mode: {:?})",
            name.unwrap_or("latest backup"),
            mode
        );

        let document = match name {
            Some(name) => Some(self.snapshots.read_snapshot(name).await?),
            None => self.snapshots.read_latest().await?,
        };
        let Some(document) = document else {
            info!("no backups found, nothing to restore");
            return Ok(RestoreReport::default());
        };

        let forest = parse_forest(document.into_forest());
        if forest.is_empty() {
            warn!("snapshot has no mergeable tree, nothing to restore");
            return Ok(RestoreReport::default());
        }

        let report = restore_forest(self.store.as_ref(), &forest, mode).await?;
        info!(
            "restore complete: {} added, {} removed, {} failed",
            report.added,
            report.removed,
            report.errors.len()
        );
        Ok(report)
    }

    /// List remote backups, newest first.
    pub async fn list_backups(&self) -> Result<Vec<BackupRecord>> {
        self.snapshots.list_backups().await
    }

    /// Delete one remote backup by name.
    pub async fn delete_backup(&self, name: &str) -> Result<()> {
        self.snapshots.delete_backup(name).await
    }

    /// Whether any remote backup exists.
    pub async fn has_backups(&self) -> bool {
        self.snapshots.has_backups().await
    }
}
