//! The cluster configuration as understood by this version of the code.
//!
//! Adding a field here is how a new release learns about configuration that
//! older releases could only carry in `unknownConfigProperties`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::helm::HelmExtensions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub binary_override_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metadata_override_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Roles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsupported_overrides: Option<UnsupportedOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<NodeRole>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<NodeRole>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRole {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Overrides that bypass validation. Use at your own risk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsupportedOverrides {
    /// k0s configuration overrides, as YAML text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub k0s: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub builtin_extensions: Vec<BuiltinExtension>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinExtension {
    #[serde(default)]
    pub name: String,
    /// Helm values, as YAML text.
    #[serde(default)]
    pub values: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm: Option<HelmExtensions>,
}
