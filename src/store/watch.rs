//! Reload-on-change for a single config file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::yaml::merge_file;
use super::StoreError;
use crate::section::ConfigSection;

/// Watches one file and merges it into a tree whenever it changes.
///
/// The parent directory is watched rather than the file itself so that
/// editors which save by renaming a temp file over the original are still
/// noticed. Dropping the `FileWatcher` stops the watch.
pub(super) struct FileWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

fn is_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

impl FileWatcher {
    pub(super) fn start(tree: Arc<ConfigSection>, path: &Path) -> Result<Self, StoreError> {
        let watch_err = |source| StoreError::Watch {
            path: path.to_path_buf(),
            source,
        };

        let target = path.to_path_buf();
        let file_name = target.file_name().map(ToOwned::to_owned);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(error = %err, "config watch error");
                    return;
                }
            };
            let touches_target = event
                .paths
                .iter()
                .any(|p| p.file_name() == file_name.as_deref());
            if !is_change(&event.kind) || !touches_target {
                return;
            }

            tracing::info!(path = %target.display(), "config file changed, reloading");
            if let Err(err) = merge_file(&tree, &target) {
                tracing::warn!(
                    path = %target.display(),
                    error = %err,
                    "failed to reload config, keeping current values"
                );
            }
        })
        .map_err(watch_err)?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(watch_err)?;

        tracing::info!(path = %path.display(), "config watcher started");
        Ok(Self {
            path: path.to_path_buf(),
            _watcher: watcher,
        })
    }
}

impl fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileWatcher")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ConfigNode;
    use serial_test::serial;
    use std::time::{Duration, Instant};

    fn wait_for(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        false
    }

    #[test]
    #[serial]
    fn reloads_when_the_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "level: 1\n").unwrap();

        let tree = Arc::new(ConfigSection::default());
        merge_file(&tree, &path).unwrap();
        let _watcher = FileWatcher::start(Arc::clone(&tree), &path).unwrap();

        std::fs::write(&path, "level: 2\n").unwrap();
        assert!(
            wait_for(|| tree.try_get_object("level").ok() == Some(ConfigNode::Int(2))),
            "tree never picked up the new value"
        );
    }

    #[test]
    #[serial]
    fn ignores_sibling_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "level: 1\n").unwrap();

        let tree = Arc::new(ConfigSection::default());
        merge_file(&tree, &path).unwrap();
        let _watcher = FileWatcher::start(Arc::clone(&tree), &path).unwrap();

        std::fs::write(dir.path().join("other.yaml"), "level: 9\n").unwrap();
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(tree.get_int("level"), 1);
    }

    #[test]
    fn watching_a_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("config.yaml");
        let tree = Arc::new(ConfigSection::default());
        let err = FileWatcher::start(tree, &path).unwrap_err();
        assert!(matches!(err, StoreError::Watch { .. }));
    }
}
