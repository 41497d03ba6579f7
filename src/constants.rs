//! App-wide constants.
//!
//! Centralises the tool name, key-path syntax, file defaults and
//! environment variable names so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "yamlconf";

/// Current crate version, as reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Separator between the segments of a key path (`server:http:port`).
pub const KEY_SEPARATOR: char = ':';

/// Permission bits used when a default config file has to be created.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

// ── Environment variable names ──────────────────────────────────────

/// Config file reference used by the binary when `--config` is absent.
pub const ENV_CONFIG: &str = "YAMLCONF_CONFIG";

/// `tracing` filter directive for the binary (e.g. `info`, `yamlconf=debug`).
pub const ENV_LOG: &str = "YAMLCONF_LOG";
