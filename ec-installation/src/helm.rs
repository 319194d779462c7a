//! Helm repositories and charts installed as cluster extensions.

use serde::{Deserialize, Serialize};

/// Settings for helm based cluster extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmExtensions {
    /// How many charts to install in parallel. Zero leaves the choice to
    /// the installer and is not written.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub concurrency_level: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: RepositoriesSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charts: ChartsSettings,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

pub type RepositoriesSettings = Vec<Repository>;

/// A repository entry. Fields map to the flags of `helm repo add`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: String,
    pub url: String,
    #[serde(rename = "caFile")]
    pub ca_file: String,
    #[serde(rename = "certFile")]
    pub cert_file: String,
    pub insecure: bool,
    #[serde(rename = "keyfile")]
    pub key_file: String,
    pub username: String,
    pub password: String,
}

pub type ChartsSettings = Vec<Chart>;

/// A single chart to install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chart {
    pub name: String,
    #[serde(rename = "chartname")]
    pub chart_name: String,
    pub version: String,
    /// Values for the chart, as YAML text.
    pub values: String,
    #[serde(rename = "namespace")]
    pub target_ns: String,
    /// How long to wait for the installation to finish, as a duration
    /// string such as `"300ms"` or `"2h45m"`.
    ///
    /// Unlike k0s, which always writes this field and renders an unset
    /// timeout as `"0s"`, an empty timeout is omitted. Otherwise every chart
    /// in a desired configuration that leaves it out would differ from the
    /// canonical form and be stored as unknown.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timeout: String,
    pub order: i32,
}
