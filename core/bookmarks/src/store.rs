//! Bookmark store trait definition.
//!
//! The store is the destination side of every restore: it owns node identity
//! and lifecycle, and is mutated one node at a time with no transactional
//! wrapper. Implementations adapt a concrete bookmark database (a browser
//! profile, a file, memory).

use async_trait::async_trait;

use marksync_common::{NodeId, Result};

use crate::tree::TreeNode;

/// A node as reported by a bookmark store.
///
/// `url` mirrors the collaborator API shape: `None` for folders. Store DTOs
/// keep that shape; snapshot-side logic uses the tagged
/// [`crate::tree::SnapshotNode`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreNode {
    pub id: NodeId,
    pub title: String,
    pub url: Option<String>,
    /// Position among siblings.
    pub index: u32,
    /// Creation time in epoch milliseconds.
    pub date_added: i64,
    /// Last modification time in epoch milliseconds.
    pub date_modified: i64,
}

impl StoreNode {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

/// Request to create a node under a parent folder.
#[derive(Debug, Clone)]
pub struct CreateNode {
    pub parent: NodeId,
    pub title: String,
    /// `Some` creates a bookmark, `None` a folder.
    pub url: Option<String>,
}

/// Partial update of a node's editable fields.
#[derive(Debug, Clone, Default)]
pub struct NodeChanges {
    pub title: Option<String>,
    pub url: Option<String>,
}

/// Async interface to a local bookmark store.
///
/// All operations suspend the caller until completion; the store is never
/// driven concurrently by the reconciler. New nodes are appended at the end
/// of their parent's children (append-only creation semantics).
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Capture the full forest as wire nodes, top-level roots first.
    ///
    /// # Postconditions
    /// - `children` is omitted on bookmarks and on empty folders
    /// - Sibling order reflects the store's current ordering
    async fn tree(&self) -> Result<Vec<TreeNode>>;

    /// List the top-level roots in environment order.
    async fn top_level(&self) -> Result<Vec<StoreNode>>;

    /// List the direct children of a folder, in order.
    ///
    /// # Errors
    /// - Folder not found
    /// - Node is not a folder
    async fn children(&self, folder: &NodeId) -> Result<Vec<StoreNode>>;

    /// Create a bookmark or folder under a parent.
    ///
    /// # Preconditions
    /// - `parent` must exist and be a folder
    ///
    /// # Postconditions
    /// - The node is appended after the parent's existing children
    async fn create(&self, node: CreateNode) -> Result<StoreNode>;

    /// Update a node's title and/or url.
    ///
    /// # Errors
    /// - Node not found
    /// - Setting a url on a folder
    async fn update(&self, id: &NodeId, changes: NodeChanges) -> Result<StoreNode>;

    /// Remove a bookmark or an empty folder.
    ///
    /// # Errors
    /// - Node not found
    /// - Folder is not empty (use [`BookmarkStore::remove_subtree`])
    async fn remove(&self, id: &NodeId) -> Result<()>;

    /// Remove a folder together with all of its descendants.
    async fn remove_subtree(&self, id: &NodeId) -> Result<()>;
}
