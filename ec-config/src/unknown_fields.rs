//! Preserving configuration fields the current schema does not know.
//!
//! When a configuration document arrives that is newer than the code
//! handling it, decoding it into the typed configuration loses every field
//! the type does not declare. [`store`] records what was lost as a merge
//! patch against the typed value's canonical form. [`apply`] merges that
//! patch back and re-decodes, which recovers whatever the *current* schema
//! can represent. After an upgrade that is usually everything.
//!
//! The patch text is never consumed. `apply` may run on every load, by
//! every version of the code, and fields it still cannot represent are
//! dropped again without error.

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{codec, merge_patch, Error, RawDocument, Result};

/// What [`apply`] did to the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// There was no patch to apply.
    NoPatch,
    /// The patch holds nothing the configuration does not already say.
    Unchanged,
    /// The configuration was replaced by the patched document.
    Updated,
}

/// Compute the patch text that regenerates `new_doc` from the canonical
/// form of `config`.
///
/// Returns `""` when the two are equal. The result is a complete
/// replacement for any previously stored patch, never an addition to it.
pub fn store<T: Serialize + ?Sized>(config: &T, new_doc: &RawDocument) -> Result<String> {
    let current = codec::encode(config)?;
    if merge_patch::documents_equal(&current, new_doc) {
        debug!("configuration document matches the typed configuration");
        return Ok(String::new());
    }
    let patch = merge_patch::diff(&current, new_doc);
    codec::to_yaml(&patch)
}

/// [`store`], with the new document given as YAML or JSON text.
pub fn store_yaml<T: Serialize + ?Sized>(config: &T, new_doc: &str) -> Result<String> {
    let new_doc = codec::from_yaml(new_doc)?;
    store(config, &new_doc)
}

/// Merge the stored patch onto `config` and re-decode it.
///
/// `config` is only written on [`ApplyOutcome::Updated`]; on error it is
/// left as it was.
pub fn apply<T>(config: &mut T, patch_text: &str) -> Result<ApplyOutcome>
where
    T: Serialize + DeserializeOwned,
{
    if patch_text.trim().is_empty() {
        return Ok(ApplyOutcome::NoPatch);
    }

    let original = codec::encode(config)?;
    let patch: RawDocument = serde_yaml::from_str(patch_text)
        .map_err(|e| Error::decoding("parse stored configuration patch", e))?;
    let merged = merge_patch::apply_patch(&original, &patch);
    if merge_patch::documents_equal(&original, &merged) {
        debug!("stored configuration patch is already reflected");
        return Ok(ApplyOutcome::Unchanged);
    }

    *config = codec::decode(&merged)?;
    debug!("configuration updated from stored patch");
    Ok(ApplyOutcome::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    /// The schema before `b` was introduced.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Old {
        a: i64,
    }

    /// The schema after `b` was introduced.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct New {
        a: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        b: Option<i64>,
    }

    #[test]
    fn store_records_added_field() {
        let text = store(&Old { a: 1 }, &json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(text, "b: 2\n");
    }

    #[test]
    fn store_without_drift_is_empty() {
        assert_eq!(store(&Old { a: 1 }, &json!({"a": 1})).unwrap(), "");
        assert_eq!(store(&Old { a: 1 }, &json!({"a": 1.0})).unwrap(), "");
    }

    #[test]
    fn store_records_deletion() {
        let text = store(&New { a: 1, b: Some(2) }, &json!({"a": 1})).unwrap();
        assert_eq!(text, "b: null\n");
        let patch = codec::from_yaml(&text).unwrap();
        assert_eq!(
            merge_patch::apply_patch(&json!({"a": 1, "b": 2}), &patch),
            json!({"a": 1})
        );
    }

    #[test]
    fn store_is_not_cumulative() {
        let first = store(&Old { a: 1 }, &json!({"a": 1, "b": 2})).unwrap();
        let second = store(&Old { a: 1 }, &json!({"a": 1, "c": 3})).unwrap();
        assert_eq!(first, "b: 2\n");
        assert_eq!(second, "c: 3\n");
    }

    #[test]
    fn store_yaml_parses_text() {
        let text = store_yaml(&Old { a: 1 }, "a: 1\nb:\n  c: [1, 2]\n").unwrap();
        assert_eq!(
            codec::from_yaml(&text).unwrap(),
            json!({"b": {"c": [1, 2]}})
        );
    }

    #[test]
    fn store_yaml_rejects_malformed_text() {
        assert!(store_yaml(&Old { a: 1 }, "a: [").unwrap_err().is_decoding());
    }

    #[test]
    fn apply_empty_patch_is_noop() {
        let mut config = Old { a: 1 };
        assert_eq!(apply(&mut config, "").unwrap(), ApplyOutcome::NoPatch);
        assert_eq!(apply(&mut config, " \n").unwrap(), ApplyOutcome::NoPatch);
        assert_eq!(config, Old { a: 1 });
    }

    #[test]
    fn apply_unknown_field_is_dropped_again() {
        let patch_text = store(&Old { a: 1 }, &json!({"a": 1, "b": 2})).unwrap();
        let mut config = Old { a: 1 };
        apply(&mut config, &patch_text).unwrap();
        assert_eq!(config, Old { a: 1 });
        assert_eq!(patch_text, "b: 2\n");
    }

    #[test]
    fn apply_recovers_field_after_upgrade() {
        let patch_text = store(&Old { a: 1 }, &json!({"a": 1, "b": 2})).unwrap();

        let mut config = New { a: 1, b: None };
        assert_eq!(
            apply(&mut config, &patch_text).unwrap(),
            ApplyOutcome::Updated
        );
        assert_eq!(config, New { a: 1, b: Some(2) });

        // Reapplying finds nothing new.
        assert_eq!(
            apply(&mut config, &patch_text).unwrap(),
            ApplyOutcome::Unchanged
        );
        assert_eq!(config, New { a: 1, b: Some(2) });
    }

    #[test]
    fn apply_overrides_known_field() {
        let mut config = New { a: 1, b: None };
        apply(&mut config, "a: 5\n").unwrap();
        assert_eq!(config, New { a: 5, b: None });
    }

    #[test]
    fn apply_twice_is_stable() {
        let patch_text = "a: 3\nb: 4\nc: 5\n";
        let mut first = Old { a: 1 };
        apply(&mut first, patch_text).unwrap();
        let mut second = first.clone();
        apply(&mut second, patch_text).unwrap();
        assert_eq!(first, Old { a: 3 });
        assert_eq!(first, second);
    }

    #[test]
    fn apply_malformed_patch_leaves_config() {
        let mut config = Old { a: 1 };
        let err = apply(&mut config, "a: [1,").unwrap_err();
        assert!(err.is_decoding());
        assert_eq!(config, Old { a: 1 });
    }

    #[test]
    fn apply_incompatible_patch_leaves_config() {
        let mut config = Old { a: 1 };
        let err = apply(&mut config, "a: not-a-number\n").unwrap_err();
        assert!(err.is_decoding());
        assert_eq!(config, Old { a: 1 });
    }

    #[test]
    fn apply_to_absent_config() {
        let mut config: Option<Old> = None;
        apply(&mut config, "a: 4\n").unwrap();
        assert_eq!(config, Some(Old { a: 4 }));
    }
}
