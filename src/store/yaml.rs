//! YAML-file store.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use super::watch::FileWatcher;
use super::{Store, StoreError};
use crate::constants::KEY_SEPARATOR;
use crate::node::{yaml, ConfigNode, Key, Mapping};
use crate::section::ConfigSection;

/// Tree of YAML documents merged over seeded defaults.
///
/// Every load merges the new document over the current tree: values from
/// the document win, keys it does not mention keep their current value.
/// This is what lets defaults seeded with `set` survive a load.
#[derive(Debug, Default)]
pub struct YamlStore {
    tree: Arc<ConfigSection>,
    watcher: Mutex<Option<FileWatcher>>,
}

impl YamlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file watcher is currently running.
    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }

    /// Stop watching, if a watcher is running.
    pub fn stop_watching(&self) {
        if self.watcher.lock().take().is_some() {
            tracing::debug!("config watcher stopped");
        }
    }
}

/// Parse `bytes` and merge the document into `tree`.
pub(super) fn merge_document(
    tree: &ConfigSection,
    bytes: &[u8],
    origin: &str,
) -> Result<(), StoreError> {
    let document = yaml::parse(bytes).map_err(|source| StoreError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    let document = match document {
        ConfigNode::Null => ConfigNode::empty_mapping(),
        ConfigNode::Mapping(_) => document,
        other => return Err(StoreError::NotAMapping { found: other.kind() }),
    };
    tree.update(|root| root.merge(document));
    Ok(())
}

/// Read `path` and merge it into `tree`.
pub(super) fn merge_file(tree: &ConfigSection, path: &Path) -> Result<(), StoreError> {
    let bytes = std::fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    merge_document(tree, &bytes, &path.display().to_string())
}

fn ensure_mapping(node: &mut ConfigNode) -> &mut Mapping {
    match node {
        ConfigNode::Mapping(map) => map,
        other => {
            *other = ConfigNode::empty_mapping();
            ensure_mapping(other)
        }
    }
}

fn set_path(root: &mut ConfigNode, path: &str, value: ConfigNode) {
    let mut segments: Vec<&str> = path.split(KEY_SEPARATOR).collect();
    let Some(last) = segments.pop() else {
        return;
    };
    let mut node = root;
    for segment in segments {
        node = ensure_mapping(node)
            .entry(Key::from(segment))
            .or_insert_with(ConfigNode::empty_mapping);
    }
    ensure_mapping(node).insert(Key::from(last), value);
}

impl Store for YamlStore {
    fn get(&self, path: &str) -> Result<ConfigNode, StoreError> {
        Ok(self.tree.try_get_object(path)?)
    }

    fn set(&self, path: &str, value: ConfigNode) {
        if path.is_empty() {
            tracing::debug!("ignoring set with an empty key path");
            return;
        }
        self.tree.update(|root| set_path(root, path, value));
    }

    fn root(&self) -> Arc<ConfigNode> {
        self.tree.get_raw()
    }

    fn read_config_bytes(&self, bytes: &[u8]) -> Result<(), StoreError> {
        merge_document(&self.tree, bytes, "<bytes>")
    }

    fn read_config_file(&self, path: &Path) -> Result<(), StoreError> {
        merge_file(&self.tree, path)
    }

    fn read_and_watch_config_file(&self, path: &Path) -> Result<(), StoreError> {
        merge_file(&self.tree, path)?;
        let watcher = FileWatcher::start(Arc::clone(&self.tree), path)?;
        // Replacing drops (and stops) any previous watcher.
        *self.watcher.lock() = Some(watcher);
        Ok(())
    }

    fn write_config_file(&self, path: &Path, mode: u32) -> Result<(), StoreError> {
        let text = yaml::render(&self.tree.get_raw()).map_err(StoreError::Serialize)?;
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, text).map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .map_err(write_err)?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        tracing::debug!(path = %path.display(), "config file written");
        Ok(())
    }
}
