//! In-memory bookmark store.
//!
//! Reference implementation of [`BookmarkStore`] used by tests and by the
//! CLI's file-backed round trip. All data lives in memory and is lost on
//! drop.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use async_trait::async_trait;
use marksync_common::{Error, NodeId, Result};

use crate::store::{BookmarkStore, CreateNode, NodeChanges, StoreNode};
use crate::tree::TreeNode;

#[derive(Debug, Clone)]
struct MemNode {
    id: NodeId,
    parent: Option<NodeId>,
    title: String,
    url: Option<String>,
    date_added: i64,
    date_modified: i64,
    children: Vec<NodeId>,
}

impl MemNode {
    fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<NodeId, MemNode>,
    roots: Vec<NodeId>,
}

impl Inner {
    fn sibling_index(&self, node: &MemNode) -> u32 {
        let siblings = match &node.parent {
            Some(parent) => &self.nodes[parent].children,
            None => &self.roots,
        };
        siblings.iter().position(|id| *id == node.id).unwrap_or(0) as u32
    }

    fn store_node(&self, node: &MemNode) -> StoreNode {
        StoreNode {
            id: node.id.clone(),
            title: node.title.clone(),
            url: node.url.clone(),
            index: self.sibling_index(node),
            date_added: node.date_added,
            date_modified: node.date_modified,
        }
    }

    fn wire_node(&self, id: &NodeId, index: u32) -> TreeNode {
        let node = &self.nodes[id];
        let children = if node.is_folder() && !node.children.is_empty() {
            Some(
                node.children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| self.wire_node(child, i as u32))
                    .collect(),
            )
        } else {
            None
        };

        TreeNode {
            id: id.to_string(),
            title: node.title.clone(),
            url: node.url.clone(),
            date_added: node.date_added,
            date_modified: node.date_modified,
            index,
            children,
        }
    }

    fn detach(&mut self, id: &NodeId) {
        let parent = self.nodes.get(id).and_then(|n| n.parent.clone());
        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|child| child != id);
                }
            }
            None => self.roots.retain(|root| root != id),
        }
    }

    fn collect_subtree(&self, id: &NodeId, out: &mut Vec<NodeId>) {
        out.push(id.clone());
        if let Some(node) = self.nodes.get(id) {
            for child in &node.children {
                self.collect_subtree(child, out);
            }
        }
    }
}

/// In-memory bookmark store.
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

fn fresh_id() -> NodeId {
    NodeId::new(Uuid::new_v4().to_string()).expect("uuid ids are non-empty")
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl MemoryStore {
    /// Create an empty store with no roots.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Create a store pre-seeded with the given root folders.
    pub fn with_roots(titles: &[&str]) -> Self {
        let store = Self::new();
        for title in titles {
            store.add_root_folder(title);
        }
        store
    }

    /// Append a top-level root folder.
    pub fn add_root_folder(&self, title: &str) -> StoreNode {
        let mut inner = self.inner.write().unwrap();
        let id = fresh_id();
        let now = now_ms();
        let node = MemNode {
            id: id.clone(),
            parent: None,
            title: title.to_string(),
            url: None,
            date_added: now,
            date_modified: now,
            children: Vec::new(),
        };
        inner.nodes.insert(id.clone(), node);
        inner.roots.push(id.clone());
        let node = inner.nodes[&id].clone();
        inner.store_node(&node)
    }

    /// Populate the store from a wire forest, preserving order and
    /// timestamps. Ids from the wire are discarded; the store assigns its
    /// own.
    pub fn seed_forest(&self, forest: Vec<TreeNode>) {
        fn insert(inner: &mut Inner, node: TreeNode, parent: Option<NodeId>) {
            let id = fresh_id();
            let children = node.children.unwrap_or_default();
            let mem = MemNode {
                id: id.clone(),
                parent: parent.clone(),
                title: node.title,
                url: node.url,
                date_added: node.date_added,
                date_modified: node.date_modified,
                children: Vec::new(),
            };
            inner.nodes.insert(id.clone(), mem);
            match parent {
                Some(parent) => inner
                    .nodes
                    .get_mut(&parent)
                    .expect("parent inserted before child")
                    .children
                    .push(id.clone()),
                None => inner.roots.push(id.clone()),
            }
            if inner.nodes[&id].is_folder() {
                for child in children {
                    insert(inner, child, Some(id.clone()));
                }
            }
        }

        let mut inner = self.inner.write().unwrap();
        for root in forest {
            insert(&mut inner, root, None);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookmarkStore for MemoryStore {
    async fn tree(&self) -> Result<Vec<TreeNode>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .roots
            .iter()
            .enumerate()
            .map(|(i, id)| inner.wire_node(id, i as u32))
            .collect())
    }

    async fn top_level(&self) -> Result<Vec<StoreNode>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .roots
            .iter()
            .map(|id| inner.store_node(&inner.nodes[id]))
            .collect())
    }

    async fn children(&self, folder: &NodeId) -> Result<Vec<StoreNode>> {
        let inner = self.inner.read().unwrap();
        let node = inner
            .nodes
            .get(folder)
            .ok_or_else(|| Error::NotFound(format!("Folder not found: {}", folder)))?;
        if !node.is_folder() {
            return Err(Error::InvalidInput("Not a folder".to_string()));
        }
        Ok(node
            .children
            .iter()
            .map(|id| inner.store_node(&inner.nodes[id]))
            .collect())
    }

    async fn create(&self, request: CreateNode) -> Result<StoreNode> {
        let mut inner = self.inner.write().unwrap();
        match inner.nodes.get(&request.parent) {
            Some(parent) if parent.is_folder() => {}
            Some(_) => return Err(Error::InvalidInput("Parent is a bookmark".to_string())),
            None => {
                return Err(Error::NotFound(format!(
                    "Parent not found: {}",
                    request.parent
                )))
            }
        }

        let id = fresh_id();
        let now = now_ms();
        let node = MemNode {
            id: id.clone(),
            parent: Some(request.parent.clone()),
            title: request.title,
            url: request.url,
            date_added: now,
            date_modified: now,
            children: Vec::new(),
        };
        inner.nodes.insert(id.clone(), node);
        inner
            .nodes
            .get_mut(&request.parent)
            .expect("parent checked above")
            .children
            .push(id.clone());

        let node = inner.nodes[&id].clone();
        Ok(inner.store_node(&node))
    }

    async fn update(&self, id: &NodeId, changes: NodeChanges) -> Result<StoreNode> {
        let mut inner = self.inner.write().unwrap();
        let node = inner
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("Node not found: {}", id)))?;

        if node.is_folder() && changes.url.is_some() {
            return Err(Error::InvalidInput(
                "Cannot set a url on a folder".to_string(),
            ));
        }
        if let Some(title) = changes.title {
            node.title = title;
        }
        if let Some(url) = changes.url {
            node.url = Some(url);
        }
        node.date_modified = now_ms();

        let node = node.clone();
        Ok(inner.store_node(&node))
    }

    async fn remove(&self, id: &NodeId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let node = inner
            .nodes
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("Node not found: {}", id)))?;
        if node.is_folder() && !node.children.is_empty() {
            return Err(Error::InvalidInput(
                "Use remove_subtree for non-empty folders".to_string(),
            ));
        }
        inner.detach(id);
        inner.nodes.remove(id);
        Ok(())
    }

    async fn remove_subtree(&self, id: &NodeId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if !inner.nodes.contains_key(id) {
            return Err(Error::NotFound(format!("Node not found: {}", id)));
        }
        inner.detach(id);
        let mut doomed = Vec::new();
        inner.collect_subtree(id, &mut doomed);
        for victim in doomed {
            inner.nodes.remove(&victim);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark_request(parent: &NodeId, title: &str, url: &str) -> CreateNode {
        CreateNode {
            parent: parent.clone(),
            title: title.to_string(),
            url: Some(url.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_appends_in_order() {
        let store = MemoryStore::with_roots(&["Bookmarks bar"]);
        let root = store.top_level().await.unwrap()[0].clone();

        store
            .create(bookmark_request(&root.id, "A", "http://a"))
            .await
            .unwrap();
        let second = store
            .create(bookmark_request(&root.id, "B", "http://b"))
            .await
            .unwrap();

        assert_eq!(second.index, 1);
        let children = store.children(&root.id).await.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].title, "A");
        assert_eq!(children[1].title, "B");
    }

    #[tokio::test]
    async fn test_create_under_bookmark_fails() {
        let store = MemoryStore::with_roots(&["Bookmarks bar"]);
        let root = store.top_level().await.unwrap()[0].clone();
        let leaf = store
            .create(bookmark_request(&root.id, "A", "http://a"))
            .await
            .unwrap();

        let result = store.create(bookmark_request(&leaf.id, "B", "http://b")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_rejects_nonempty_folder() {
        let store = MemoryStore::with_roots(&["Bookmarks bar"]);
        let root = store.top_level().await.unwrap()[0].clone();
        let folder = store
            .create(CreateNode {
                parent: root.id.clone(),
                title: "Docs".to_string(),
                url: None,
            })
            .await
            .unwrap();
        store
            .create(bookmark_request(&folder.id, "X", "http://x"))
            .await
            .unwrap();

        assert!(store.remove(&folder.id).await.is_err());
        store.remove_subtree(&folder.id).await.unwrap();
        assert!(store.children(&root.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_subtree_drops_descendants() {
        let store = MemoryStore::with_roots(&["Bookmarks bar"]);
        let root = store.top_level().await.unwrap()[0].clone();
        let folder = store
            .create(CreateNode {
                parent: root.id.clone(),
                title: "Docs".to_string(),
                url: None,
            })
            .await
            .unwrap();
        let leaf = store
            .create(bookmark_request(&folder.id, "X", "http://x"))
            .await
            .unwrap();

        store.remove_subtree(&folder.id).await.unwrap();
        assert!(store.children(&leaf.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_bookmark() {
        let store = MemoryStore::with_roots(&["Bookmarks bar"]);
        let root = store.top_level().await.unwrap()[0].clone();
        let leaf = store
            .create(bookmark_request(&root.id, "Old", "http://old"))
            .await
            .unwrap();

        let updated = store
            .update(
                &leaf.id,
                NodeChanges {
                    title: Some("New".to_string()),
                    url: Some("http://new".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.url.as_deref(), Some("http://new"));

        let folder_root = store.top_level().await.unwrap()[0].clone();
        let result = store
            .update(
                &folder_root.id,
                NodeChanges {
                    title: None,
                    url: Some("http://nope".to_string()),
                },
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_seed_forest_then_tree() {
        let forest = vec![TreeNode {
            id: "ignored".to_string(),
            title: "Bookmarks bar".to_string(),
            url: None,
            date_added: 100,
            date_modified: 200,
            index: 0,
            children: Some(vec![
                TreeNode {
                    id: String::new(),
                    title: "A".to_string(),
                    url: Some("http://a".to_string()),
                    date_added: 1,
                    date_modified: 1,
                    index: 0,
                    children: None,
                },
                TreeNode {
                    id: String::new(),
                    title: "Empty".to_string(),
                    url: None,
                    date_added: 2,
                    date_modified: 2,
                    index: 1,
                    children: None,
                },
            ]),
        }];

        let store = MemoryStore::new();
        store.seed_forest(forest);

        let tree = store.tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.title, "Bookmarks bar");
        assert_ne!(root.id, "ignored");
        let children = root.children.as_ref().unwrap();
        assert_eq!(children[0].url.as_deref(), Some("http://a"));
        // Empty folders serialize without a children field.
        assert!(children[1].children.is_none());
        assert_eq!(children[1].index, 1);
    }
}
