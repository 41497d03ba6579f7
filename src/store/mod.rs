//! The loader behind a [`YamlConfig`](crate::config::YamlConfig).
//!
//! A [`Store`] owns the in-memory tree: it parses documents into it, keeps it
//! fresh in watch mode, answers root-level lookups and writes it back out
//! when a default file has to be created. [`YamlStore`] is the YAML-file
//! implementation used by default; the trait exists so the root handle and
//! the path resolver can be driven by any other loader.

mod watch;
pub mod yaml;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::node::{ConfigNode, NodeKind};
use crate::section::SectionError;

pub use yaml::YamlStore;

/// Errors raised by a [`Store`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse config {origin}: {source}")]
    Parse {
        origin: String,
        source: serde_yaml_ng::Error,
    },

    #[error("config document root is a {found}, not a mapping")]
    NotAMapping { found: NodeKind },

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml_ng::Error),

    #[error("failed to write config file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to watch config file {path}: {source}")]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },

    #[error(transparent)]
    Lookup(#[from] SectionError),
}

/// Loader contract: owns the tree and moves it between memory and disk.
///
/// Paths passed to `get` and `set` use the same colon-delimited syntax as
/// [`ConfigSection`](crate::section::ConfigSection).
pub trait Store: Send + Sync {
    /// Fetch a copy of the node at `path`.
    fn get(&self, path: &str) -> Result<ConfigNode, StoreError>;

    /// Install `value` at `path`, creating intermediate mappings.
    fn set(&self, path: &str, value: ConfigNode);

    /// The whole tree.
    fn root(&self) -> Arc<ConfigNode>;

    /// Merge a serialized document into the tree.
    fn read_config_bytes(&self, bytes: &[u8]) -> Result<(), StoreError>;

    /// Merge a file into the tree once.
    fn read_config_file(&self, path: &Path) -> Result<(), StoreError>;

    /// Merge a file into the tree and keep merging it whenever it changes.
    fn read_and_watch_config_file(&self, path: &Path) -> Result<(), StoreError>;

    /// Persist the current tree to `path` with permission bits `mode`.
    fn write_config_file(&self, path: &Path, mode: u32) -> Result<(), StoreError>;
}
