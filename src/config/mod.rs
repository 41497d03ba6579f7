//! Root configuration handle.
//!
//! Ties the pieces together: seed defaults, locate the file with
//! [`PathResolver`](crate::resolve::PathResolver), load it (optionally
//! watching for changes) into a [`Store`](crate::store::Store), then hand
//! out [`ConfigSection`](crate::section::ConfigSection) views over the tree.

pub mod loader;

pub use loader::{ConfigError, YamlConfig};
