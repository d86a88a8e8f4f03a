//! Bookmark tree snapshot model.
//!
//! The wire format ships a recursive node shape in which the presence of
//! `url` is the only discriminant between bookmarks and folders. That shape
//! is accepted verbatim at the serialization boundary and converted into an
//! explicit tagged variant (`SnapshotNode`) before any logic runs, so the
//! rest of the system never re-inspects "is url present".

use serde::{Deserialize, Serialize};

/// A node as it appears in a snapshot file.
///
/// `url` present means bookmark, absent means folder. `children` is only
/// written for non-empty folders. `id` is environment-local and carried for
/// diagnostics only; it is never used for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Creation time in epoch milliseconds. Informational only.
    #[serde(default)]
    pub date_added: i64,
    /// Last modification time in epoch milliseconds. Informational only.
    #[serde(default)]
    pub date_modified: i64,
    /// Position among siblings at snapshot time.
    #[serde(default)]
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

/// A parsed snapshot node with the variant made explicit.
///
/// Conversion from [`TreeNode`] drops the environment-local `id` and the
/// informational timestamps: matching identity is position + content.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotNode {
    Bookmark {
        title: String,
        url: String,
        index: u32,
    },
    Folder {
        title: String,
        index: u32,
        children: Vec<SnapshotNode>,
    },
}

impl SnapshotNode {
    /// Convert a wire node into the tagged representation.
    ///
    /// A node carrying a `url` is a bookmark regardless of any `children`
    /// field a malformed producer may have attached; the children are
    /// dropped.
    pub fn from_wire(node: TreeNode) -> Self {
        match node.url {
            Some(url) => SnapshotNode::Bookmark {
                title: node.title,
                url,
                index: node.index,
            },
            None => SnapshotNode::Folder {
                title: node.title,
                index: node.index,
                children: node
                    .children
                    .unwrap_or_default()
                    .into_iter()
                    .map(SnapshotNode::from_wire)
                    .collect(),
            },
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SnapshotNode::Bookmark { title, .. } | SnapshotNode::Folder { title, .. } => title,
        }
    }

    pub fn index(&self) -> u32 {
        match self {
            SnapshotNode::Bookmark { index, .. } | SnapshotNode::Folder { index, .. } => *index,
        }
    }

    /// Children of a folder; empty for bookmarks.
    pub fn children(&self) -> &[SnapshotNode] {
        match self {
            SnapshotNode::Folder { children, .. } => children,
            SnapshotNode::Bookmark { .. } => &[],
        }
    }

    pub fn is_bookmark(&self) -> bool {
        matches!(self, SnapshotNode::Bookmark { .. })
    }
}

/// Parse a wire forest into tagged nodes.
pub fn parse_forest(forest: Vec<TreeNode>) -> Vec<SnapshotNode> {
    forest.into_iter().map(SnapshotNode::from_wire).collect()
}

/// A bookmark flattened out of the tree, for listings and statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBookmark {
    pub title: String,
    pub url: String,
    /// Slash-joined folder titles from the root down to the containing
    /// folder; empty for top-level bookmarks.
    pub folder_path: String,
}

/// Flatten a forest into its bookmarks, depth first.
pub fn flatten(forest: &[SnapshotNode]) -> Vec<FlatBookmark> {
    fn walk(nodes: &[SnapshotNode], folder_path: &str, out: &mut Vec<FlatBookmark>) {
        for node in nodes {
            match node {
                SnapshotNode::Bookmark { title, url, .. } => out.push(FlatBookmark {
                    title: title.clone(),
                    url: url.clone(),
                    folder_path: folder_path.to_string(),
                }),
                SnapshotNode::Folder {
                    title, children, ..
                } => {
                    let child_path = if folder_path.is_empty() {
                        title.clone()
                    } else {
                        format!("{}/{}", folder_path, title)
                    };
                    walk(children, &child_path, out);
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(forest, "", &mut out);
    out
}

/// Node counts for a forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeCounts {
    pub folders: usize,
    pub bookmarks: usize,
}

impl NodeCounts {
    pub fn total(&self) -> usize {
        self.folders + self.bookmarks
    }
}

/// Count folders and bookmarks in a forest.
pub fn count_nodes(forest: &[SnapshotNode]) -> NodeCounts {
    let mut counts = NodeCounts::default();
    fn walk(nodes: &[SnapshotNode], counts: &mut NodeCounts) {
        for node in nodes {
            match node {
                SnapshotNode::Bookmark { .. } => counts.bookmarks += 1,
                SnapshotNode::Folder { children, .. } => {
                    counts.folders += 1;
                    walk(children, counts);
                }
            }
        }
    }
    walk(forest, &mut counts);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(title: &str, url: &str, index: u32) -> TreeNode {
        TreeNode {
            id: String::new(),
            title: title.to_string(),
            url: Some(url.to_string()),
            date_added: 0,
            date_modified: 0,
            index,
            children: None,
        }
    }

    fn folder(title: &str, index: u32, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: String::new(),
            title: title.to_string(),
            url: None,
            date_added: 0,
            date_modified: 0,
            index,
            children: if children.is_empty() {
                None
            } else {
                Some(children)
            },
        }
    }

    #[test]
    fn test_url_is_the_discriminant() {
        let parsed = SnapshotNode::from_wire(bookmark("Docs", "http://docs", 0));
        assert!(parsed.is_bookmark());

        let parsed = SnapshotNode::from_wire(folder("Docs", 0, vec![]));
        assert!(!parsed.is_bookmark());
        assert!(parsed.children().is_empty());
    }

    #[test]
    fn test_bookmark_with_children_drops_them() {
        let mut node = bookmark("odd", "http://odd", 0);
        node.children = Some(vec![bookmark("child", "http://child", 0)]);

        let parsed = SnapshotNode::from_wire(node);
        assert!(parsed.is_bookmark());
        assert!(parsed.children().is_empty());
    }

    #[test]
    fn test_wire_shape_omits_absent_fields() {
        let json = serde_json::to_value(folder("Empty", 0, vec![])).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("url"));
        assert!(!object.contains_key("children"));
        assert!(object.contains_key("dateAdded"));
    }

    #[test]
    fn test_wire_parse_tolerates_missing_fields() {
        let node: TreeNode = serde_json::from_str(r#"{"title":"Bar"}"#).unwrap();
        assert_eq!(node.title, "Bar");
        assert!(node.url.is_none());
        assert_eq!(node.index, 0);
    }

    #[test]
    fn test_flatten_builds_folder_paths() {
        let forest = parse_forest(vec![
            bookmark("Top", "http://top", 0),
            folder(
                "Work",
                1,
                vec![folder("Docs", 0, vec![bookmark("X", "http://x", 0)])],
            ),
        ]);

        let flat = flatten(&forest);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].folder_path, "");
        assert_eq!(flat[1].folder_path, "Work/Docs");
        assert_eq!(flat[1].url, "http://x");
    }

    #[test]
    fn test_count_nodes() {
        let forest = parse_forest(vec![folder(
            "Work",
            0,
            vec![
                bookmark("A", "http://a", 0),
                folder("Inner", 1, vec![bookmark("B", "http://b", 0)]),
            ],
        )]);

        let counts = count_nodes(&forest);
        assert_eq!(counts.folders, 2);
        assert_eq!(counts.bookmarks, 2);
        assert_eq!(counts.total(), 4);
    }
}
