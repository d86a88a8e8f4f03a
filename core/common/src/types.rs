//! Common types used throughout Marksync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a node in a bookmark store.
///
/// Ids are assigned by the store that owns the node and are only meaningful
/// within that store. They must never be used to match nodes across
/// environments or across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId from a string.
    ///
    /// # Errors
    /// - Returns error if id is empty
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidInput(
                "NodeId cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A path on the remote snapshot store, independent of the backing transport.
///
/// Remote paths are logical: the transport adapter decides how components map
/// onto its own addressing (URL segments, filesystem directories, object
/// keys).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePath {
    components: Vec<String>,
}

impl RemotePath {
    /// Create a root path.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Create a path from string components.
    ///
    /// # Errors
    /// - Returns error if any component is empty or contains a separator
    pub fn from_components(components: Vec<String>) -> crate::Result<Self> {
        for comp in &components {
            if comp.is_empty() {
                return Err(crate::Error::InvalidInput(
                    "Path component cannot be empty".to_string(),
                ));
            }
            if comp.contains('/') || comp.contains('\\') {
                return Err(crate::Error::InvalidInput(
                    "Path component cannot contain separators".to_string(),
                ));
            }
        }
        Ok(Self { components })
    }

    /// Parse a path string into RemotePath.
    ///
    /// Uses '/' as separator.
    pub fn parse(path: &str) -> crate::Result<Self> {
        if path.is_empty() || path == "/" {
            return Ok(Self::root());
        }

        let path = path.trim_start_matches('/').trim_end_matches('/');
        if path.is_empty() {
            return Ok(Self::root());
        }

        let components: Vec<String> = path.split('/').map(String::from).collect();
        Self::from_components(components)
    }

    /// Check if this is the root path.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the parent path, if any.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            let mut components = self.components.clone();
            components.pop();
            Some(Self { components })
        }
    }

    /// Get the file/directory name (last component).
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(|s| s.as_str())
    }

    /// Join this path with a child component.
    pub fn join(&self, child: &str) -> crate::Result<Self> {
        if child.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Child component cannot be empty".to_string(),
            ));
        }
        if child.contains('/') || child.contains('\\') {
            return Err(crate::Error::InvalidInput(
                "Child component cannot contain separators".to_string(),
            ));
        }
        let mut components = self.components.clone();
        components.push(child.to_string());
        Ok(Self { components })
    }

    /// Get the path components.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Convert to a string representation.
    pub fn to_string_path(&self) -> String {
        if self.is_root() {
            "/".to_string()
        } else {
            format!("/{}", self.components.join("/"))
        }
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_node_id_creation() {
        let id = NodeId::new("node-17").unwrap();
        assert_eq!(id.as_str(), "node-17");
    }

    #[test]
    fn test_node_id_empty_fails() {
        assert!(NodeId::new("").is_err());
    }

    #[test]
    fn test_remote_path_root() {
        let path = RemotePath::root();
        assert!(path.is_root());
        assert_eq!(path.to_string_path(), "/");
    }

    #[test]
    fn test_remote_path_parse() {
        let path = RemotePath::parse("/bookmark-sync/bookmarks_2025-01-15_143052.json").unwrap();
        assert_eq!(
            path.components(),
            &["bookmark-sync", "bookmarks_2025-01-15_143052.json"]
        );
    }

    #[test]
    fn test_remote_path_join() {
        let path = RemotePath::root().join("bookmark-sync").unwrap();
        assert_eq!(path.to_string_path(), "/bookmark-sync");
    }

    #[test]
    fn test_remote_path_parent() {
        let path = RemotePath::parse("/dir/file.json").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string_path(), "/dir");
    }

    #[test]
    fn test_remote_path_name() {
        let path = RemotePath::parse("/dir/file.json").unwrap();
        assert_eq!(path.name(), Some("file.json"));
    }

    #[test]
    fn test_remote_path_rejects_separator_in_component() {
        assert!(RemotePath::root().join("a/b").is_err());
    }

    proptest! {
        #[test]
        fn parse_round_trips(components in proptest::collection::vec("[a-zA-Z0-9._-]{1,12}", 0..5)) {
            let path = RemotePath::from_components(components.clone()).unwrap();
            let reparsed = RemotePath::parse(&path.to_string_path()).unwrap();
            prop_assert_eq!(reparsed.components(), components.as_slice());
        }
    }
}
