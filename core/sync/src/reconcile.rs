//! Tree reconciliation between a snapshot forest and a live bookmark store.
//!
//! Reconciliation walks the snapshot against the destination one parent at a
//! time. Within a parent, nodes match on content alone: `(title, url)` for
//! bookmarks, `title` for folders, never on ids or positions. Matched
//! folders are descended into so nested content merges without duplicating
//! the folder; matched bookmarks are left untouched. Everything unmatched is
//! created, in ascending recorded-index order.
//!
//! Mutation failures are contained at single-node granularity: the failing
//! node is recorded in the report and its siblings are still processed. The
//! caller must not run two reconciliations against the same store at once;
//! the children listing taken at each level assumes it is the only writer.

use std::collections::HashMap;

use futures::future::BoxFuture;
use tracing::{debug, error, info, warn};

use marksync_bookmarks::{BookmarkStore, CreateNode, SnapshotNode, StoreNode};
use marksync_common::{NodeId, Result};

use crate::aliases::resolve_top_folder;

/// How a restore treats existing destination content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Only add missing nodes; never remove or edit existing ones.
    Incremental,
    /// Clear each matched top-level folder's direct children first.
    Overwrite,
}

/// What a failed single-node mutation was trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Remove,
    CreateBookmark,
    CreateFolder,
}

/// A single-node mutation failure, surfaced alongside the success count.
#[derive(Debug, Clone)]
pub struct NodeError {
    pub title: String,
    pub action: NodeAction,
    pub message: String,
}

/// Outcome of one reconciliation run.
///
/// `removed` counts overwrite-mode clearing and is diagnostic only; it is
/// never part of `added`. A non-empty `errors` list means the run was
/// incomplete even if `added` is nonzero.
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Newly created nodes, folders and bookmarks combined.
    pub added: usize,
    /// Nodes removed while clearing matched top folders in overwrite mode.
    pub removed: usize,
    /// Single-node failures that were skipped over.
    pub errors: Vec<NodeError>,
}

/// Matching key for one destination child.
///
/// The variant is part of the key, so a folder and a bookmark sharing a
/// title at the same level never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildKey {
    Bookmark { title: String, url: String },
    Folder { title: String },
}

impl ChildKey {
    pub fn of_snapshot(node: &SnapshotNode) -> Self {
        match node {
            SnapshotNode::Bookmark { title, url, .. } => ChildKey::Bookmark {
                title: title.clone(),
                url: url.clone(),
            },
            SnapshotNode::Folder { title, .. } => ChildKey::Folder {
                title: title.clone(),
            },
        }
    }

    /// Key for a node reported by the store. The store DTO carries the
    /// collaborator's url-optional shape; this is the one place it is
    /// interpreted.
    pub fn of_existing(node: &StoreNode) -> Self {
        match &node.url {
            Some(url) => ChildKey::Bookmark {
                title: node.title.clone(),
                url: url.clone(),
            },
            None => ChildKey::Folder {
                title: node.title.clone(),
            },
        }
    }
}

/// Planned handling of one snapshot sibling.
#[derive(Debug)]
pub enum ChildPlan<'a> {
    /// Content-identical node already present. Folders still recurse.
    Matched {
        node: &'a SnapshotNode,
        existing: NodeId,
    },
    /// Bookmark missing from the destination.
    CreateLeaf { node: &'a SnapshotNode },
    /// Folder missing from the destination; its whole subtree is new.
    CreateSubtree { node: &'a SnapshotNode },
}

/// Plan one sibling level.
///
/// Pure function over the two sequences: builds the composite-key lookup of
/// existing children, sorts snapshot siblings by recorded index (stable, so
/// equal indices keep snapshot order), and tags each one. Ordering of the
/// returned plan is the creation order.
pub fn plan_children<'a>(
    snapshot: &'a [SnapshotNode],
    existing: &[StoreNode],
) -> Vec<ChildPlan<'a>> {
    let lookup: HashMap<ChildKey, NodeId> = existing
        .iter()
        .map(|node| (ChildKey::of_existing(node), node.id.clone()))
        .collect();

    let mut ordered: Vec<&SnapshotNode> = snapshot.iter().collect();
    ordered.sort_by_key(|node| node.index());

    ordered
        .into_iter()
        .map(|node| match lookup.get(&ChildKey::of_snapshot(node)) {
            Some(id) => ChildPlan::Matched {
                node,
                existing: id.clone(),
            },
            None if node.is_bookmark() => ChildPlan::CreateLeaf { node },
            None => ChildPlan::CreateSubtree { node },
        })
        .collect()
}

/// Merge a snapshot forest into the destination store.
///
/// Top-level roots resolve against the destination's top folders through the
/// alias table; unresolved roots are skipped without error. Returns the
/// report with the total added count.
pub async fn restore_forest<S>(
    store: &S,
    forest: &[SnapshotNode],
    mode: RestoreMode,
) -> Result<RestoreReport>
where
    S: BookmarkStore + ?Sized,
{
    Reconciler::new(store).run(forest, mode).await
}

struct Reconciler<'a, S: ?Sized> {
    store: &'a S,
    report: RestoreReport,
}

impl<'a, S: BookmarkStore + ?Sized> Reconciler<'a, S> {
    fn new(store: &'a S) -> Self {
        Self {
            store,
            report: RestoreReport::default(),
        }
    }

    async fn run(mut self, forest: &[SnapshotNode], mode: RestoreMode) -> Result<RestoreReport> {
        let tops = self.store.top_level().await?;
        debug!(
            mode = ?mode,
            top_folders = tops.len(),
            roots = forest.len(),
            "starting reconciliation"
        );

        for root in forest {
            let Some(target) = resolve_top_folder(root.title(), &tops) else {
                warn!("no top-level folder matches '{}', skipping subtree", root.title());
                continue;
            };
            debug!("matched top folder '{}' -> '{}'", root.title(), target.title);

            if mode == RestoreMode::Overwrite {
                let removed = self.clear_children(&target.id).await?;
                info!("cleared {} nodes under '{}'", removed, target.title);
            }

            if !root.children().is_empty() {
                let added = self.merge_children(root.children(), target.id.clone()).await?;
                self.report.added += added;
            }
        }

        Ok(self.report)
    }

    /// Flat wipe of a folder's direct children. Folder children take their
    /// subtrees with them. Failures are recorded and skipped.
    async fn clear_children(&mut self, folder: &NodeId) -> Result<usize> {
        let children = self.store.children(folder).await?;
        let mut removed = 0;

        for child in children {
            let result = if child.is_folder() {
                self.store.remove_subtree(&child.id).await
            } else {
                self.store.remove(&child.id).await
            };
            match result {
                Ok(()) => removed += 1,
                Err(err) => {
                    error!("failed to remove '{}': {}", child.title, err);
                    self.report.errors.push(NodeError {
                        title: child.title.clone(),
                        action: NodeAction::Remove,
                        message: err.to_string(),
                    });
                }
            }
        }

        self.report.removed += removed;
        Ok(removed)
    }

    /// Merge one sibling level, returning the nodes added beneath it.
    ///
    /// Boxed for async recursion.
    fn merge_children<'b>(
        &'b mut self,
        nodes: &'b [SnapshotNode],
        parent: NodeId,
    ) -> BoxFuture<'b, Result<usize>> {
        Box::pin(async move {
            let existing = self.store.children(&parent).await?;
            let plan = plan_children(nodes, &existing);
            let mut added = 0;

            for step in plan {
                match step {
                    ChildPlan::Matched { node, existing } => {
                        if !node.children().is_empty() {
                            added += self.merge_children(node.children(), existing).await?;
                        }
                    }
                    ChildPlan::CreateLeaf { node } => {
                        let SnapshotNode::Bookmark { title, url, .. } = node else {
                            continue;
                        };
                        let request = CreateNode {
                            parent: parent.clone(),
                            title: title.clone(),
                            url: Some(url.clone()),
                        };
                        match self.store.create(request).await {
                            Ok(_) => {
                                debug!("created bookmark '{}'", title);
                                added += 1;
                            }
                            Err(err) => {
                                error!("failed to create bookmark '{}': {}", title, err);
                                self.report.errors.push(NodeError {
                                    title: title.clone(),
                                    action: NodeAction::CreateBookmark,
                                    message: err.to_string(),
                                });
                            }
                        }
                    }
                    ChildPlan::CreateSubtree { node } => {
                        let request = CreateNode {
                            parent: parent.clone(),
                            title: node.title().to_string(),
                            url: None,
                        };
                        match self.store.create(request).await {
                            Ok(folder) => {
                                debug!("created folder '{}'", folder.title);
                                added += 1;
                                if !node.children().is_empty() {
                                    added +=
                                        self.merge_children(node.children(), folder.id).await?;
                                }
                            }
                            Err(err) => {
                                error!("failed to create folder '{}': {}", node.title(), err);
                                self.report.errors.push(NodeError {
                                    title: node.title().to_string(),
                                    action: NodeAction::CreateFolder,
                                    message: err.to_string(),
                                });
                            }
                        }
                    }
                }
            }

            Ok(added)
        })
    }
}
