//! The in-memory configuration tree.
//!
//! A loaded document is a tree of [`ConfigNode`]s: scalars at the leaves,
//! sequences and mappings in between. Every accessor in this crate works on
//! this model; conversion to and from the YAML and JSON value models lives
//! in the submodules so the rest of the crate never touches parser types.

pub mod json;
pub mod yaml;

use std::fmt;

use indexmap::IndexMap;
use strum::Display;

pub use json::EncodeError;

/// Ordered key → node storage used by [`ConfigNode::Mapping`].
pub type Mapping = IndexMap<Key, ConfigNode>;

/// A mapping key.
///
/// Key-path segments only ever match [`Key::String`]; the other variants
/// exist so documents with non-string keys still load without collisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    String(String),
    Int(i64),
    Bool(bool),
    /// Float, null and complex keys, kept as their YAML text so they render
    /// back to the same key.
    Other(String),
}

impl Key {
    /// The key as a string, if it is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::String(s) | Key::Other(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{i}"),
            Key::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

/// One value of the configuration tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigNode {
    /// An explicit null (`key: ~`).
    #[default]
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Sequence(Vec<ConfigNode>),
    Mapping(Mapping),
}

/// The shape of a [`ConfigNode`], used in type-mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Null,
    String,
    Int,
    Float,
    Bool,
    Sequence,
    Mapping,
}

impl ConfigNode {
    /// An empty mapping, the shape of a freshly created document.
    pub fn empty_mapping() -> Self {
        ConfigNode::Mapping(Mapping::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ConfigNode::Null => NodeKind::Null,
            ConfigNode::String(_) => NodeKind::String,
            ConfigNode::Int(_) => NodeKind::Int,
            ConfigNode::Float(_) => NodeKind::Float,
            ConfigNode::Bool(_) => NodeKind::Bool,
            ConfigNode::Sequence(_) => NodeKind::Sequence,
            ConfigNode::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigNode::Null)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigNode::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a string key in a mapping node.
    ///
    /// Returns `None` when the key is absent or `self` is not a mapping.
    pub fn child(&self, key: &str) -> Option<&ConfigNode> {
        self.as_mapping()?.get(&Key::from(key))
    }

    /// Walk `segments` through nested mappings.
    pub fn lookup<'a, I>(&self, segments: I) -> Option<&ConfigNode>
    where
        I: IntoIterator<Item = &'a str>,
    {
        segments
            .into_iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Deep-merge `other` over `self`.
    ///
    /// Mappings are merged key by key; any other combination is replaced by
    /// `other`. Keys only present in `self` survive.
    pub fn merge(&mut self, other: ConfigNode) {
        match (self, other) {
            (ConfigNode::Mapping(base), ConfigNode::Mapping(over)) => {
                for (key, value) in over {
                    match base.get_mut(&key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            base.insert(key, value);
                        }
                    }
                }
            }
            (slot, other) => *slot = other,
        }
    }
}

/// Go-style textual rendering: `[a b]` for sequences, `map[k:v]` for
/// mappings, `<nil>` for null.
impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigNode::Null => f.write_str("<nil>"),
            ConfigNode::String(s) => f.write_str(s),
            ConfigNode::Int(i) => write!(f, "{i}"),
            ConfigNode::Float(v) if v.is_infinite() => {
                f.write_str(if v.is_sign_positive() { "+Inf" } else { "-Inf" })
            }
            ConfigNode::Float(v) => write!(f, "{v}"),
            ConfigNode::Bool(b) => write!(f, "{b}"),
            ConfigNode::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ConfigNode::Mapping(map) => {
                f.write_str("map[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for ConfigNode {
    fn from(s: &str) -> Self {
        ConfigNode::String(s.to_string())
    }
}

impl From<String> for ConfigNode {
    fn from(s: String) -> Self {
        ConfigNode::String(s)
    }
}

impl From<i64> for ConfigNode {
    fn from(i: i64) -> Self {
        ConfigNode::Int(i)
    }
}

impl From<i32> for ConfigNode {
    fn from(i: i32) -> Self {
        ConfigNode::Int(i64::from(i))
    }
}

impl From<u32> for ConfigNode {
    fn from(i: u32) -> Self {
        ConfigNode::Int(i64::from(i))
    }
}

impl From<f64> for ConfigNode {
    fn from(v: f64) -> Self {
        ConfigNode::Float(v)
    }
}

impl From<bool> for ConfigNode {
    fn from(b: bool) -> Self {
        ConfigNode::Bool(b)
    }
}

impl<T: Into<ConfigNode>> From<Vec<T>> for ConfigNode {
    fn from(items: Vec<T>) -> Self {
        ConfigNode::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping> for ConfigNode {
    fn from(map: Mapping) -> Self {
        ConfigNode::Mapping(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapping(entries: Vec<(&str, ConfigNode)>) -> ConfigNode {
        ConfigNode::Mapping(entries.into_iter().map(|(k, v)| (Key::from(k), v)).collect())
    }

    #[test]
    fn lookup_walks_nested_mappings() {
        let tree = mapping(vec![("a", mapping(vec![("b", ConfigNode::Int(3))]))]);
        assert_eq!(tree.lookup(["a", "b"]), Some(&ConfigNode::Int(3)));
        assert_eq!(tree.lookup(["a", "c"]), None);
        assert_eq!(tree.lookup(["a", "b", "c"]), None);
    }

    #[test]
    fn lookup_ignores_non_string_keys() {
        let mut map = Mapping::new();
        map.insert(Key::Int(1), ConfigNode::from("one"));
        let tree = ConfigNode::Mapping(map);
        assert_eq!(tree.lookup(["1"]), None);
    }

    #[test]
    fn display_matches_generic_rendering() {
        let node = ConfigNode::from(vec![ConfigNode::Int(1), ConfigNode::from("x")]);
        assert_eq!(node.to_string(), "[1 x]");

        let node = mapping(vec![("k", ConfigNode::Bool(true))]);
        assert_eq!(node.to_string(), "map[k:true]");

        assert_eq!(ConfigNode::Null.to_string(), "<nil>");
        assert_eq!(ConfigNode::Float(2.5).to_string(), "2.5");
    }

    #[test]
    fn display_non_finite_floats() {
        assert_eq!(ConfigNode::Float(f64::INFINITY).to_string(), "+Inf");
        assert_eq!(ConfigNode::Float(f64::NEG_INFINITY).to_string(), "-Inf");
        assert_eq!(ConfigNode::Float(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn merge_overrides_and_keeps_existing_keys() {
        let mut base = mapping(vec![
            ("keep", ConfigNode::Int(1)),
            ("nested", mapping(vec![("a", ConfigNode::Int(1)), ("b", ConfigNode::Int(2))])),
        ]);
        let over = mapping(vec![
            ("nested", mapping(vec![("b", ConfigNode::Int(20))])),
            ("new", ConfigNode::from("x")),
        ]);

        base.merge(over);

        assert_eq!(
            base,
            mapping(vec![
                ("keep", ConfigNode::Int(1)),
                ("nested", mapping(vec![("a", ConfigNode::Int(1)), ("b", ConfigNode::Int(20))])),
                ("new", ConfigNode::from("x")),
            ])
        );
    }

    #[test]
    fn merge_replaces_mismatched_shapes() {
        let mut base = mapping(vec![("a", ConfigNode::Int(1))]);
        base.merge(ConfigNode::from("scalar"));
        assert_eq!(base, ConfigNode::from("scalar"));
    }

    #[test]
    fn kind_names_are_lowercase() {
        assert_eq!(NodeKind::Sequence.to_string(), "sequence");
        assert_eq!(ConfigNode::Float(1.0).kind(), NodeKind::Float);
    }
}
