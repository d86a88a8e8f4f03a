//! Bookmark domain model for Marksync.
//!
//! This crate holds the snapshot tree model (wire shape and parsed tagged
//! variant), the snapshot file envelope, and the local bookmark store
//! abstraction with its in-memory reference implementation.

pub mod memory;
pub mod snapshot;
pub mod store;
pub mod tree;

pub use memory::MemoryStore;
pub use snapshot::{SnapshotDocument, FORMAT_VERSION};
pub use store::{BookmarkStore, CreateNode, NodeChanges, StoreNode};
pub use tree::{
    count_nodes, flatten, parse_forest, FlatBookmark, NodeCounts, SnapshotNode, TreeNode,
};
