//! Image-column codec
//!
//! Records persist their image references as a JSON array in a single text
//! column. Rows written before multi-image support hold a bare filename
//! instead; those are read back as a one-element list. The fallback is
//! permanent: legacy rows are never rewritten.

use crate::error::Result;
use crate::types::ImageReference;
use serde_json::Value;

/// Encode references as the stored JSON array.
pub fn encode_image_column(images: &[ImageReference]) -> Result<String> {
    Ok(serde_json::to_string(images)?)
}

/// Decode a stored column.
///
/// - absent or empty → `[]`
/// - JSON array of strings → that array, order preserved
/// - anything else → the raw column wrapped as a single reference
pub fn decode_image_column(column: Option<&str>) -> Vec<ImageReference> {
    let raw = match column {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Vec::new(),
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items.into_iter().map(reference_from_value).collect(),
        _ => vec![ImageReference::new(raw)],
    }
}

/// Coerce a wire value (`images` or legacy `image`) into a reference list.
pub fn coerce_image_value(value: Value) -> Vec<ImageReference> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(reference_from_value).collect(),
        Value::String(s) => decode_image_column(Some(&s)),
        other => vec![ImageReference::new(other.to_string())],
    }
}

fn reference_from_value(value: Value) -> ImageReference {
    match value {
        Value::String(s) => ImageReference::new(s),
        other => ImageReference::new(other.to_string()),
    }
}
