//! Typed, path-addressed access into one mapping of the configuration tree.
//!
//! A [`ConfigSection`] wraps a node plus its own reader/writer lock. Keys are
//! colon-delimited paths (`server:http:port`) walked through nested mappings.
//!
//! Getters come in three flavours:
//! - `try_get_*` returns a [`SectionError`] for every failure.
//! - `get_*` treats any failure as unrecoverable: it logs the error and
//!   panics with it. Use these for settings the program cannot start without.
//! - `get_*_default` returns the supplied default when the key does not
//!   resolve. A value of the wrong type is still unrecoverable.
//!
//! `get_string_list` and `get_duration` coerce by value instead of by type
//! (see [`coerce`]).
//!
//! # Locking
//!
//! The lock guards only this section's pointer to its node. Sections derived
//! with [`ConfigSection::get_section`] hold a copy of the sub-tree and their
//! own lock, so reloading a parent never affects a derived section: obtain
//! sections afresh after a reload instead of caching them.

pub mod coerce;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::constants::KEY_SEPARATOR;
use crate::node::json::{self, EncodeError};
use crate::node::{ConfigNode, NodeKind};

/// Errors while reading from a [`ConfigSection`].
#[derive(Error, Debug)]
pub enum SectionError {
    #[error("key {key:?} not found")]
    KeyNotFound { key: String },

    #[error("data is not a mapping")]
    NotAMapping,

    #[error("key {key:?} holds a {found}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("data for key {key:?} is not available")]
    NotAvailable { key: String },

    #[error("top-level key {key:?} is not a string")]
    NonStringKey { key: String },

    #[error("encode section: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode section: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SectionError {
    /// `true` when the key path did not resolve, as opposed to resolving to
    /// something unusable. Only misses fall back to defaults.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            SectionError::KeyNotFound { .. } | SectionError::NotAMapping
        )
    }
}

/// Abort on a configuration error the caller declared unrecoverable.
fn fatal(err: SectionError) -> ! {
    tracing::error!(error = %err, "unrecoverable configuration error");
    panic!("{err}");
}

fn or_default<T>(result: Result<T, SectionError>, def: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) if err.is_miss() => def,
        Err(err) => fatal(err),
    }
}

/// A view over one mapping node of the configuration tree.
#[derive(Debug)]
pub struct ConfigSection {
    data: RwLock<Arc<ConfigNode>>,
}

impl ConfigSection {
    /// Wrap a node. Any shape is accepted; lookups into a non-mapping fail
    /// with [`SectionError::NotAMapping`].
    pub fn new(node: ConfigNode) -> Self {
        Self::from_shared(Arc::new(node))
    }

    /// Wrap an already shared node without copying it.
    pub fn from_shared(node: Arc<ConfigNode>) -> Self {
        Self {
            data: RwLock::new(node),
        }
    }

    /// Resolve `key` and hand the node to `f`, all under one read lock.
    fn with_node<R>(
        &self,
        key: &str,
        f: impl FnOnce(&ConfigNode) -> R,
    ) -> Result<R, SectionError> {
        let data = self.data.read();
        if data.as_mapping().is_none() {
            return Err(SectionError::NotAMapping);
        }

        let not_found = || SectionError::KeyNotFound {
            key: key.to_string(),
        };
        if key.is_empty() {
            return Err(not_found());
        }
        let node = data.lookup(key.split(KEY_SEPARATOR)).ok_or_else(not_found)?;
        Ok(f(node))
    }

    fn typed<T>(
        &self,
        key: &str,
        expected: NodeKind,
        extract: impl FnOnce(&ConfigNode) -> Option<T>,
    ) -> Result<T, SectionError> {
        self.with_node(key, |node| {
            extract(node).ok_or_else(|| SectionError::TypeMismatch {
                key: key.to_string(),
                expected,
                found: node.kind(),
            })
        })?
    }

    // ── Untyped ─────────────────────────────────────────────────────

    /// Resolve `key` to a copy of its node.
    pub fn try_get_object(&self, key: &str) -> Result<ConfigNode, SectionError> {
        self.with_node(key, ConfigNode::clone)
    }

    pub fn get_object(&self, key: &str) -> ConfigNode {
        self.try_get_object(key).unwrap_or_else(|err| fatal(err))
    }

    /// Resolve `key`, or return `def` unchanged when it is missing.
    pub fn get_object_default(&self, key: &str, def: ConfigNode) -> ConfigNode {
        or_default(self.try_get_object(key), def)
    }

    // ── Strings ─────────────────────────────────────────────────────

    pub fn try_get_string(&self, key: &str) -> Result<String, SectionError> {
        self.typed(key, NodeKind::String, |node| match node {
            ConfigNode::String(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn get_string(&self, key: &str) -> String {
        self.try_get_string(key).unwrap_or_else(|err| fatal(err))
    }

    pub fn get_string_default(&self, key: &str, def: &str) -> String {
        or_default(self.try_get_string(key), def.to_string())
    }

    /// Every element of a sequence rendered as a string.
    ///
    /// Integers and booleans use their canonical text, floats their shortest
    /// round-trip form, nested values a generic rendering. A non-sequence
    /// yields an empty list; a missing key is unrecoverable.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.with_node(key, coerce::string_list)
            .unwrap_or_else(|err| fatal(err))
    }

    // ── Booleans and numbers ────────────────────────────────────────

    pub fn try_get_bool(&self, key: &str) -> Result<bool, SectionError> {
        self.typed(key, NodeKind::Bool, |node| match node {
            ConfigNode::Bool(b) => Some(*b),
            _ => None,
        })
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.try_get_bool(key).unwrap_or_else(|err| fatal(err))
    }

    pub fn get_bool_default(&self, key: &str, def: bool) -> bool {
        or_default(self.try_get_bool(key), def)
    }

    pub fn try_get_int(&self, key: &str) -> Result<i64, SectionError> {
        self.typed(key, NodeKind::Int, |node| match node {
            ConfigNode::Int(i) => Some(*i),
            _ => None,
        })
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.try_get_int(key).unwrap_or_else(|err| fatal(err))
    }

    pub fn get_int_default(&self, key: &str, def: i64) -> i64 {
        or_default(self.try_get_int(key), def)
    }

    /// Floats only; an integer value is a type mismatch.
    pub fn try_get_float64(&self, key: &str) -> Result<f64, SectionError> {
        self.typed(key, NodeKind::Float, |node| match node {
            ConfigNode::Float(v) => Some(*v),
            _ => None,
        })
    }

    pub fn get_float64(&self, key: &str) -> f64 {
        self.try_get_float64(key).unwrap_or_else(|err| fatal(err))
    }

    pub fn get_float64_default(&self, key: &str, def: f64) -> f64 {
        or_default(self.try_get_float64(key), def)
    }

    // ── Durations ───────────────────────────────────────────────────

    /// Interpret `key` as a duration.
    ///
    /// `None` means "no usable value": the key is missing, or the value is
    /// neither a non-negative number (nanoseconds) nor a parsable duration
    /// string. `Some(Duration::ZERO)` is a real, explicitly configured zero.
    pub fn get_duration(&self, key: &str) -> Option<Duration> {
        self.with_node(key, coerce::duration).ok().flatten()
    }

    pub fn get_duration_default(&self, key: &str, def: Duration) -> Duration {
        self.get_duration(key).unwrap_or(def)
    }

    // ── Sections ────────────────────────────────────────────────────

    /// A new section over the node at `key`, with its own lock.
    ///
    /// Fails when the key is missing or null. The node is not required to be
    /// a mapping; lookups in the new section report that instead.
    pub fn get_section(&self, key: &str) -> Result<ConfigSection, SectionError> {
        let node = self.try_get_object(key)?;
        if node.is_null() {
            return Err(SectionError::NotAvailable {
                key: key.to_string(),
            });
        }
        Ok(ConfigSection::new(node))
    }

    pub fn must_get_section(&self, key: &str) -> ConfigSection {
        self.get_section(key).unwrap_or_else(|err| fatal(err))
    }

    /// Decode the top level of this section into `T` through JSON.
    ///
    /// All top-level keys must be strings.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T, SectionError> {
        let value = {
            let data = self.data.read();
            let map = data.as_mapping().ok_or(SectionError::NotAMapping)?;
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, node) in map {
                let name = key.as_str().ok_or_else(|| SectionError::NonStringKey {
                    key: key.to_string(),
                })?;
                object.insert(name.to_string(), json::to_json(node)?);
            }
            serde_json::Value::Object(object)
        };
        serde_json::from_value(value).map_err(SectionError::Decode)
    }

    /// The backing node, shared rather than copied.
    pub fn get_raw(&self) -> Arc<ConfigNode> {
        Arc::clone(&self.data.read())
    }

    // ── Writers ─────────────────────────────────────────────────────

    /// Swap the backing node.
    pub fn replace(&self, node: ConfigNode) {
        *self.data.write() = Arc::new(node);
    }

    /// Mutate the backing node in place under the write lock.
    ///
    /// Handles previously returned by [`get_raw`](Self::get_raw) keep the
    /// old tree.
    pub fn update<R>(&self, f: impl FnOnce(&mut ConfigNode) -> R) -> R {
        let mut data = self.data.write();
        f(Arc::make_mut(&mut data))
    }
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self::new(ConfigNode::empty_mapping())
    }
}

/// A clone shares the node but gets a lock of its own.
impl Clone for ConfigSection {
    fn clone(&self) -> Self {
        Self::from_shared(self.get_raw())
    }
}
