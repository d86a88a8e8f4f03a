//! In-memory snapshot transport for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use marksync_common::{Error, RemotePath, Result};

use crate::transport::{Entry, SnapshotTransport};

#[derive(Debug, Clone)]
enum MemEntry {
    File { data: Vec<u8>, entry: Entry },
    Directory { entry: Entry },
}

impl MemEntry {
    fn entry(&self) -> &Entry {
        match self {
            MemEntry::File { entry, .. } => entry,
            MemEntry::Directory { entry } => entry,
        }
    }
}

/// In-memory snapshot transport.
///
/// Useful for testing and development. All data is stored in memory and lost
/// on drop.
pub struct MemoryTransport {
    storage: Arc<RwLock<HashMap<String, MemEntry>>>,
}

impl MemoryTransport {
    /// Create a new empty memory transport.
    pub fn new() -> Self {
        let mut storage = HashMap::new();
        storage.insert(
            "/".to_string(),
            MemEntry::Directory {
                entry: Entry {
                    name: "/".to_string(),
                    path: RemotePath::root(),
                    size: None,
                    is_directory: true,
                    modified: Utc::now(),
                },
            },
        );

        Self {
            storage: Arc::new(RwLock::new(storage)),
        }
    }

    fn path_to_key(path: &RemotePath) -> String {
        path.to_string_path()
    }

    fn check_parent(
        storage: &HashMap<String, MemEntry>,
        path: &RemotePath,
    ) -> Result<()> {
        if let Some(parent) = path.parent() {
            match storage.get(&Self::path_to_key(&parent)) {
                Some(MemEntry::Directory { .. }) => {}
                Some(MemEntry::File { .. }) => {
                    return Err(Error::InvalidInput("Parent is a file".to_string()));
                }
                None => {
                    return Err(Error::NotFound("Parent directory not found".to_string()));
                }
            }
        }
        Ok(())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotTransport for MemoryTransport {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write(&self, path: &RemotePath, data: Vec<u8>) -> Result<Entry> {
        let key = Self::path_to_key(path);
        let mut storage = self.storage.write().unwrap();
        Self::check_parent(&storage, path)?;

        let entry = Entry {
            name: path.name().unwrap_or("/").to_string(),
            path: path.clone(),
            size: Some(data.len() as u64),
            is_directory: false,
            modified: Utc::now(),
        };
        storage.insert(
            key,
            MemEntry::File {
                data,
                entry: entry.clone(),
            },
        );

        Ok(entry)
    }

    async fn read(&self, path: &RemotePath) -> Result<Vec<u8>> {
        let key = Self::path_to_key(path);
        let storage = self.storage.read().unwrap();

        match storage.get(&key) {
            Some(MemEntry::File { data, .. }) => Ok(data.clone()),
            Some(MemEntry::Directory { .. }) => {
                Err(Error::InvalidInput("Cannot read a directory".to_string()))
            }
            None => Err(Error::NotFound(format!("File not found: {}", path))),
        }
    }

    async fn list(&self, dir: &RemotePath) -> Result<Vec<Entry>> {
        let key = Self::path_to_key(dir);
        let storage = self.storage.read().unwrap();

        match storage.get(&key) {
            Some(MemEntry::Directory { .. }) => {}
            Some(MemEntry::File { .. }) => {
                return Err(Error::InvalidInput("Not a directory".to_string()));
            }
            None => {
                return Err(Error::NotFound(format!("Directory not found: {}", dir)));
            }
        }

        let prefix = if dir.is_root() {
            "/".to_string()
        } else {
            format!("{}/", key)
        };

        let mut results = Vec::new();
        for (entry_key, entry) in storage.iter() {
            if entry_key == &key {
                continue;
            }
            if let Some(relative) = entry_key.strip_prefix(&prefix) {
                // Only direct children.
                if !relative.contains('/') {
                    results.push(entry.entry().clone());
                }
            }
        }

        Ok(results)
    }

    async fn remove(&self, path: &RemotePath) -> Result<()> {
        let key = Self::path_to_key(path);
        let mut storage = self.storage.write().unwrap();

        match storage.get(&key) {
            Some(MemEntry::File { .. }) => {
                storage.remove(&key);
                Ok(())
            }
            Some(MemEntry::Directory { .. }) => {
                Err(Error::InvalidInput("Cannot remove a directory".to_string()))
            }
            None => Err(Error::NotFound(format!("File not found: {}", path))),
        }
    }

    async fn ensure_directory(&self, path: &RemotePath) -> Result<()> {
        let key = Self::path_to_key(path);
        let mut storage = self.storage.write().unwrap();

        match storage.get(&key) {
            Some(MemEntry::Directory { .. }) => return Ok(()),
            Some(MemEntry::File { .. }) => {
                return Err(Error::InvalidInput(format!(
                    "Path exists as a file: {}",
                    path
                )));
            }
            None => {}
        }
        Self::check_parent(&storage, path)?;

        storage.insert(
            key,
            MemEntry::Directory {
                entry: Entry {
                    name: path.name().unwrap_or("/").to_string(),
                    path: path.clone(),
                    size: None,
                    is_directory: true,
                    modified: Utc::now(),
                },
            },
        );

        Ok(())
    }
}
