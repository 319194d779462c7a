//! JSON Merge Patch (RFC 7396) over semi-structured documents.
//!
//! A merge patch is itself a document. Applying it merges objects key by
//! key, recursively. A `null` value deletes the key. Any other value
//! (scalars and arrays alike) replaces whatever was there. Arrays are never
//! diffed element by element.
//!
//! Application is delegated to [`json_patch::merge`]. The crate has no
//! merge-patch *diff*, so [`diff`] is implemented here, along with the
//! numeric-aware equality both sides of the round trip rely on.

use serde_json::{Map, Number, Value};

use crate::RawDocument;

/// A document whose contents are interpreted as merge-patch edits.
pub type MergePatch = Value;

/// Compute the patch that turns `source` into `target`.
///
/// Keys that are equal on both sides are left out, keys missing from
/// `target` become `null`, and objects present on both sides are diffed
/// recursively. When either side is not an object, the patch is `target`
/// verbatim.
///
/// Merge patches cannot express "set this key to `null`": a `null` in
/// `target` reads back as a deletion.
pub fn diff(source: &RawDocument, target: &RawDocument) -> MergePatch {
    match (source, target) {
        (Value::Object(source), Value::Object(target)) => {
            Value::Object(diff_objects(source, target))
        }
        (_, target) => target.clone(),
    }
}

fn diff_objects(source: &Map<String, Value>, target: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();

    for (key, source_value) in source {
        let Some(target_value) = target.get(key) else {
            patch.insert(key.clone(), Value::Null);
            continue;
        };
        if documents_equal(source_value, target_value) {
            continue;
        }
        let edit = match (source_value, target_value) {
            (Value::Object(s), Value::Object(t)) => Value::Object(diff_objects(s, t)),
            _ => target_value.clone(),
        };
        patch.insert(key.clone(), edit);
    }

    for (key, target_value) in target {
        if !source.contains_key(key) {
            patch.insert(key.clone(), target_value.clone());
        }
    }

    patch
}

/// Merge `patch` onto a copy of `doc`.
pub fn apply_patch(doc: &RawDocument, patch: &MergePatch) -> RawDocument {
    let mut merged = doc.clone();
    json_patch::merge(&mut merged, patch);
    merged
}

/// Deep equality of two documents.
///
/// Map key order is irrelevant. Numbers compare by value, so `1` and `1.0`
/// are equal, which matters because YAML and typed encoders disagree on how
/// to spell whole floats. Arrays compare element-wise, in order.
pub fn documents_equal(a: &RawDocument, b: &RawDocument) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| documents_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, a)| match b.get(key) {
                    Some(b) => documents_equal(a, b),
                    None => false,
                })
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
