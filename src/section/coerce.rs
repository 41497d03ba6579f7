//! Value-driven coercions used by the lenient getters.
//!
//! Unlike the exact-type getters, these inspect the stored value and convert
//! what they can instead of failing.

use std::time::Duration;

use crate::duration;
use crate::node::ConfigNode;

/// Largest float that still fits in `i64` nanoseconds.
const MAX_FLOAT_NANOS: f64 = 9.223_372_036_854_775e18;

/// Render a sequence as strings; any other shape yields an empty list.
pub fn string_list(node: &ConfigNode) -> Vec<String> {
    match node {
        ConfigNode::Sequence(items) => items.iter().map(ToString::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Interpret a node as a duration.
///
/// Integers are nanoseconds, floats are truncated nanoseconds, strings go
/// through [`duration::parse`]. `None` for anything else, including
/// negative magnitudes.
pub fn duration(node: &ConfigNode) -> Option<Duration> {
    match node {
        ConfigNode::Int(nanos) => u64::try_from(*nanos).ok().map(Duration::from_nanos),
        ConfigNode::Float(nanos) => {
            let nanos = nanos.trunc();
            // -0.0 passes; NaN fails both comparisons
            (nanos >= 0.0 && nanos < MAX_FLOAT_NANOS).then(|| Duration::from_nanos(nanos as u64))
        }
        ConfigNode::String(text) => match duration::parse(text) {
            Ok(d) => Some(d),
            Err(err) => {
                tracing::debug!(value = %text, error = %err, "ignoring unparsable duration");
                None
            }
        },
        _ => None,
    }
}
