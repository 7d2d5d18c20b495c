//! On-disk encoding of a layer.
//!
//! Layers are written as sorted-key JSON indented with four spaces and a
//! trailing newline, so saving equal content twice yields identical bytes.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use strata_tree::{kind, Layer};

use crate::error::{ConfigError, Result};

const INDENT: &[u8] = b"    ";

/// Encode a layer into its canonical byte form.
pub fn render_layer(layer: &Layer) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    layer
        .serialize(&mut serializer)
        .map_err(|e| ConfigError::Serialization(e.to_string()))?;
    buf.push(b'\n');
    Ok(buf)
}

/// Decode a layer, requiring an object at the top level.
pub fn parse_layer(resource: &str, bytes: &[u8]) -> Result<Layer> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| ConfigError::Parse {
        resource: resource.to_owned(),
        reason: e.to_string(),
    })?;
    match value {
        Value::Object(layer) => Ok(layer),
        other => Err(ConfigError::Parse {
            resource: resource.to_owned(),
            reason: format!("top-level value is a {}, expected an object", kind(&other)),
        }),
    }
}
