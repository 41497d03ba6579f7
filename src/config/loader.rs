//! `YamlConfig` and its load sequence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::env::Env;
use crate::node::ConfigNode;
use crate::resolve::{PathResolver, ResolveError};
use crate::section::ConfigSection;
use crate::store::{Store, StoreError, YamlStore};

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("get current file path: {0}")]
    Resolve(#[source] ResolveError),

    #[error("read config {path}: {source}")]
    Read { path: PathBuf, source: StoreError },

    #[error("read and watch config {path}: {source}")]
    Watch { path: PathBuf, source: StoreError },

    #[error("read config bytes: {0}")]
    Bytes(#[source] StoreError),

    #[error("get data: {0}")]
    Lookup(#[source] StoreError),

    #[error("data for key {key:?} is not available")]
    NotAvailable { key: String },
}

/// Handle on one configuration document.
///
/// ```no_run
/// use yamlconf::YamlConfig;
///
/// let mut config = YamlConfig::new("app.yaml");
/// config.load(|c| c.set_default("server:port", 8080), false)?;
/// let server = config.config_section("server")?;
/// let port = server.get_int("port");
/// # let _ = port;
/// # Ok::<(), yamlconf::config::ConfigError>(())
/// ```
pub struct YamlConfig {
    reference: String,
    env: Env,
    store: Arc<dyn Store>,
    resolved_path: Option<PathBuf>,
}

impl YamlConfig {
    /// Bind a file reference, using the real process environment and a
    /// fresh [`YamlStore`].
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            env: Env::real(),
            store: Arc::new(YamlStore::new()),
            resolved_path: None,
        }
    }

    /// Replace the environment used to resolve the file path.
    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    /// Replace the store holding the tree.
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// The path chosen by the last successful [`load`](Self::load).
    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved_path.as_deref()
    }

    /// Install `value` at `key` unless the key already resolves.
    pub fn set_default(&self, key: &str, value: impl Into<ConfigNode>) {
        if self.store.get(key).is_err() {
            self.store.set(key, value.into());
        }
    }

    /// Seed defaults, locate the file and load it.
    ///
    /// `apply_defaults` runs first so a file created by the resolver
    /// contains the defaults. With `watch`, the file is reloaded whenever it
    /// changes; sections obtained earlier keep their old view.
    pub fn load(
        &mut self,
        apply_defaults: impl FnOnce(&Self),
        watch: bool,
    ) -> Result<(), ConfigError> {
        apply_defaults(self);

        let path = PathResolver::new(self.env.clone())
            .resolve(&self.reference, self.store.as_ref())
            .map_err(ConfigError::Resolve)?;

        tracing::info!(path = %path.display(), watch, "loading config");
        if watch {
            self.store
                .read_and_watch_config_file(&path)
                .map_err(|source| ConfigError::Watch {
                    path: path.clone(),
                    source,
                })?;
        } else {
            self.store
                .read_config_file(&path)
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
        }

        self.resolved_path = Some(path);
        Ok(())
    }

    /// Seed defaults, then load an in-memory document instead of a file.
    pub fn load_bytes(
        &mut self,
        apply_defaults: impl FnOnce(&Self),
        bytes: &[u8],
    ) -> Result<(), ConfigError> {
        apply_defaults(self);
        self.store
            .read_config_bytes(bytes)
            .map_err(ConfigError::Bytes)
    }

    /// A section over the node at `key`.
    pub fn config_section(&self, key: &str) -> Result<ConfigSection, ConfigError> {
        let node = self.store.get(key).map_err(ConfigError::Lookup)?;
        if node.is_null() {
            return Err(ConfigError::NotAvailable {
                key: key.to_string(),
            });
        }
        Ok(ConfigSection::new(node))
    }

    /// A section over the whole tree as it is now.
    pub fn root(&self) -> ConfigSection {
        ConfigSection::from_shared(self.store.root())
    }
}
