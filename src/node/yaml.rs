//! Conversion between [`ConfigNode`] and the `serde_yaml_ng` value model.

use serde_yaml_ng::{Number, Value};

use super::{ConfigNode, Key, Mapping};

/// Parse a YAML document into a tree.
///
/// An empty document parses to [`ConfigNode::Null`].
pub fn parse(bytes: &[u8]) -> Result<ConfigNode, serde_yaml_ng::Error> {
    let value: Value = serde_yaml_ng::from_slice(bytes)?;
    Ok(ConfigNode::from(value))
}

/// Render a tree as a YAML document.
pub fn render(node: &ConfigNode) -> Result<String, serde_yaml_ng::Error> {
    serde_yaml_ng::to_string(&Value::from(node))
}

fn number_to_node(n: &Number) -> ConfigNode {
    match n.as_i64() {
        Some(i) => ConfigNode::Int(i),
        // u64 beyond i64::MAX and real floats
        None => ConfigNode::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn value_to_key(value: Value) -> Key {
    match value {
        Value::String(s) => Key::String(s),
        Value::Bool(b) => Key::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Key::Int(i),
            None => other_key(Value::Number(n)),
        },
        other => other_key(other),
    }
}

fn other_key(value: Value) -> Key {
    match serde_yaml_ng::to_string(&value) {
        Ok(text) => Key::Other(text.trim_end().to_string()),
        Err(_) => Key::Other(ConfigNode::from(value).to_string()),
    }
}

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigNode::Null,
            Value::Bool(b) => ConfigNode::Bool(b),
            Value::Number(n) => number_to_node(&n),
            Value::String(s) => ConfigNode::String(s),
            Value::Sequence(items) => {
                ConfigNode::Sequence(items.into_iter().map(ConfigNode::from).collect())
            }
            Value::Mapping(map) => ConfigNode::Mapping(
                map.into_iter()
                    .map(|(k, v)| (value_to_key(k), ConfigNode::from(v)))
                    .collect::<Mapping>(),
            ),
            Value::Tagged(tagged) => ConfigNode::from(tagged.value),
        }
    }
}

impl From<&Key> for Value {
    fn from(key: &Key) -> Self {
        match key {
            Key::String(s) => Value::String(s.clone()),
            Key::Other(text) => {
                serde_yaml_ng::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
            }
            Key::Int(i) => Value::Number(Number::from(*i)),
            Key::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<&ConfigNode> for Value {
    fn from(node: &ConfigNode) -> Self {
        match node {
            ConfigNode::Null => Value::Null,
            ConfigNode::String(s) => Value::String(s.clone()),
            ConfigNode::Int(i) => Value::Number(Number::from(*i)),
            ConfigNode::Float(v) => Value::Number(Number::from(*v)),
            ConfigNode::Bool(b) => Value::Bool(*b),
            ConfigNode::Sequence(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            ConfigNode::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (Value::from(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
