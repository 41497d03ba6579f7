//! Conversion from [`ConfigNode`] to `serde_json::Value`.
//!
//! JSON is the intermediate encoding for bulk decoding of a section into a
//! caller-provided struct, so only the direction tree → JSON exists.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::ConfigNode;

/// A tree that has no JSON representation.
#[derive(Error, Debug, PartialEq)]
pub enum EncodeError {
    #[error("non-finite float {0} cannot be encoded")]
    NonFinite(f64),

    #[error("mapping key {0:?} is not a string")]
    NonStringKey(String),
}

/// Encode a tree as JSON.
pub fn to_json(node: &ConfigNode) -> Result<Value, EncodeError> {
    Ok(match node {
        ConfigNode::Null => Value::Null,
        ConfigNode::String(s) => Value::String(s.clone()),
        ConfigNode::Int(i) => Value::Number(Number::from(*i)),
        ConfigNode::Float(v) => {
            Value::Number(Number::from_f64(*v).ok_or(EncodeError::NonFinite(*v))?)
        }
        ConfigNode::Bool(b) => Value::Bool(*b),
        ConfigNode::Sequence(items) => {
            Value::Array(items.iter().map(to_json).collect::<Result<_, _>>()?)
        }
        ConfigNode::Mapping(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let key = key
                    .as_str()
                    .ok_or_else(|| EncodeError::NonStringKey(key.to_string()))?;
                out.insert(key.to_string(), to_json(value)?);
            }
            Value::Object(out)
        }
    })
}
