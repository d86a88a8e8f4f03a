//! Marksync reconciliation engine.
//!
//! This crate provides the sync core:
//! - Top-level folder alias resolution across producing environments
//! - The tree reconciler with incremental and overwrite restore modes
//! - Remote snapshot file management (timestamped, immutable backups)
//! - The orchestrating sync engine

pub mod aliases;
pub mod backups;
pub mod engine;
pub mod reconcile;

// Re-export main types
pub use aliases::{alias_variants, resolve_top_folder};
pub use backups::{backup_file_name, BackupRecord, RemoteConfig, SnapshotStore, DEFAULT_SYNC_DIR};
pub use engine::SyncEngine;
pub use reconcile::{
    plan_children, restore_forest, ChildKey, ChildPlan, NodeAction, NodeError, RestoreMode,
    RestoreReport,
};
