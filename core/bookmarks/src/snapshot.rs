//! Snapshot file envelope.
//!
//! A snapshot is one immutable JSON file holding the full bookmark forest:
//! `{ "version": 2, "bookmarkTree": [...], "lastSync": <epoch-ms>,
//! "fileName": "..." }`. Earlier releases wrote a flat `bookmarks` list
//! instead; those files decode to an empty forest rather than being merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use marksync_common::{Error, Result};

use crate::tree::TreeNode;

/// Snapshot format version this crate produces and understands.
pub const FORMAT_VERSION: u32 = 2;

/// The snapshot file envelope, serialized verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark_tree: Option<Vec<TreeNode>>,
    /// Capture time in epoch milliseconds.
    #[serde(default)]
    pub last_sync: i64,
    #[serde(default)]
    pub file_name: String,
    /// Flat list written by the legacy format. Detected so it can be
    /// reported distinctly; never merged.
    #[serde(
        default,
        rename = "bookmarks",
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_bookmarks: Option<serde_json::Value>,
}

impl SnapshotDocument {
    /// Create a current-version document for a captured forest.
    pub fn new(forest: Vec<TreeNode>, file_name: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            version: FORMAT_VERSION,
            bookmark_tree: Some(forest),
            last_sync: captured_at.timestamp_millis(),
            file_name: file_name.into(),
            legacy_bookmarks: None,
        }
    }

    /// Serialize to the wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from wire bytes.
    ///
    /// # Errors
    /// - Returns error only for malformed JSON; unsupported but well-formed
    ///   envelopes parse successfully and yield an empty forest from
    ///   [`SnapshotDocument::into_forest`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Whether this envelope can be merged.
    pub fn is_supported(&self) -> bool {
        self.version == FORMAT_VERSION && self.bookmark_tree.is_some()
    }

    /// Extract the forest, degrading unsupported envelopes to empty.
    ///
    /// Legacy and unknown-version payloads are logged and return an empty
    /// forest so callers report zero changes instead of guessing a shape.
    pub fn into_forest(self) -> Vec<TreeNode> {
        if self.version == FORMAT_VERSION {
            match self.bookmark_tree {
                Some(tree) => return tree,
                None => {
                    warn!("snapshot {} has no bookmark tree, treating as empty", self.file_name);
                }
            }
        } else if self.legacy_bookmarks.is_some() {
            warn!(
                "snapshot {} uses the legacy flat format, re-create the backup to migrate",
                self.file_name
            );
        } else {
            warn!(
                "snapshot {} has unsupported version {}, treating as empty",
                self.file_name, self.version
            );
        }
        Vec::new()
    }
}
