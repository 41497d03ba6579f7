//! Typed, path-addressed access to YAML configuration files.
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod duration;
pub mod env;
pub mod node;
pub mod resolve;
pub mod section;
pub mod store;

pub use config::YamlConfig;
pub use node::ConfigNode;
pub use section::{ConfigSection, SectionError};
