//! Typed configuration that survives being read and written by code that
//! does not know all of its fields.
//!
//! - [`codec`] moves between typed values and [`RawDocument`]s.
//! - [`merge_patch`] diffs, merges and compares documents.
//! - [`unknown_fields`] stores and re-applies what the typed value drops.
//!
//! Everything here is synchronous and free of I/O and shared state.

pub mod codec;
pub mod error;
pub mod merge_patch;
pub mod unknown_fields;

pub use codec::DecodeMode;
pub use error::{Error, FormatError, Result};
pub use merge_patch::MergePatch;
pub use unknown_fields::ApplyOutcome;

/// A semi-structured document: maps, sequences and scalars.
pub type RawDocument = serde_json::Value;
