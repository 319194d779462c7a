//! Conversion between typed configuration values and their canonical
//! semi-structured form.
//!
//! The canonical form of a value is whatever `serde` produces for it,
//! captured as a [`RawDocument`]. Documents are exchanged as YAML text;
//! since YAML is a superset of JSON, JSON text is accepted as well.
//!
//! Decoding is *lenient* by default: keys that the target type does not
//! declare are dropped rather than rejected. This is what allows a document
//! written by newer code to be loaded by older code. The behavior is chosen
//! through [`DecodeMode`] instead of being left to whatever the type's
//! `Deserialize` impl happens to do, and [`undeclared_fields`] reports what
//! a lenient decode throws away.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, enabled, Level};

use crate::{Error, FormatError, RawDocument, Result};

/// How to treat keys the target type does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Drop undeclared keys.
    #[default]
    Lenient,
    /// Fail with [`FormatError::UndeclaredFields`].
    Strict,
}

/// Produce the canonical form of `value`.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<RawDocument> {
    serde_json::to_value(value).map_err(|e| Error::encoding("encode configuration", e))
}

/// Decode `doc` leniently. Same as `decode_with(doc, DecodeMode::Lenient)`.
pub fn decode<T: DeserializeOwned + Serialize>(doc: &RawDocument) -> Result<T> {
    decode_with(doc, DecodeMode::Lenient)
}

/// Decode `doc` into `T`.
///
/// Fails only when the document is structurally incompatible with `T`
/// (a wrong scalar kind, a missing required field), or, in
/// [`DecodeMode::Strict`], when it carries keys `T` does not declare.
pub fn decode_with<T: DeserializeOwned + Serialize>(
    doc: &RawDocument,
    mode: DecodeMode,
) -> Result<T> {
    let value: T = T::deserialize(doc).map_err(|e| Error::decoding("decode configuration", e))?;

    match mode {
        DecodeMode::Strict => {
            let undeclared = undeclared_in(doc, &value)?;
            if !undeclared.is_empty() {
                return Err(Error::decoding(
                    "decode configuration",
                    FormatError::UndeclaredFields(undeclared),
                ));
            }
        }
        DecodeMode::Lenient => {
            // diagnostics only; the decode itself has already succeeded
            if enabled!(Level::DEBUG) {
                if let Ok(undeclared) = undeclared_in(doc, &value) {
                    if !undeclared.is_empty() {
                        debug!(fields = ?undeclared, "dropping undeclared configuration fields");
                    }
                }
            }
        }
    }

    Ok(value)
}

/// Dotted paths of the keys in `doc` that a lenient decode into `T` drops.
///
/// A key is reported when it holds a value and is missing from the
/// canonical form of the decoded value. Empty values (`null`, `""`, `[]`,
/// `{}`) are never reported, because types commonly omit declared fields
/// when they are empty.
pub fn undeclared_fields<T>(doc: &RawDocument) -> Result<Vec<String>>
where
    T: DeserializeOwned + Serialize,
{
    let value: T = T::deserialize(doc).map_err(|e| Error::decoding("decode configuration", e))?;
    undeclared_in(doc, &value)
}

fn undeclared_in<T: Serialize>(doc: &RawDocument, value: &T) -> Result<Vec<String>> {
    let canonical = encode(value)?;
    let mut paths = Vec::new();
    collect_undeclared(doc, &canonical, "", &mut paths);
    Ok(paths)
}

fn collect_undeclared(doc: &Value, canonical: &Value, prefix: &str, out: &mut Vec<String>) {
    let (Value::Object(doc), Value::Object(canonical)) = (doc, canonical) else {
        return;
    };
    for (key, value) in doc {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match canonical.get(key) {
            Some(canonical_value) => collect_undeclared(value, canonical_value, &path, out),
            None if !is_empty(value) => out.push(path),
            None => {}
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Parse YAML (or JSON) text into a document. Blank text is `null`.
pub fn from_yaml(text: &str) -> Result<RawDocument> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text).map_err(|e| Error::decoding("parse YAML document", e))
}

/// Render a document as canonical YAML text, with map keys sorted.
pub fn to_yaml(doc: &RawDocument) -> Result<String> {
    serde_yaml::to_string(doc).map_err(|e| Error::encoding("render YAML document", e))
}
