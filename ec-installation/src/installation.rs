//! The Installation record.
//!
//! An Installation describes one desired state of the cluster: which
//! version to run, where artifacts come from, and the configuration in
//! effect. Its `spec.unknownConfigProperties` field holds, as a YAML merge
//! patch, whatever part of the desired configuration the code that wrote
//! the record could not represent in `spec.config`.

use std::fmt;

use ec_config::{unknown_fields, ApplyOutcome, RawDocument};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::{
    config::ConfigSpec,
    meta::{ListMeta, ObjectMeta, TypeMeta},
    scheme::Resource,
};

/// Tracks a cluster node by name and a hash of its status, so that status
/// changes can be detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub name: String,
    pub hash: String,
}

/// Where to download the parts of an airgap bundle from. The URLs point at
/// a registry inside the cluster; credentials are read from the cluster at
/// execution time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactsLocation {
    pub images: String,
    pub helm_charts: String,
    pub embedded_cluster_binary: String,
    pub embedded_cluster_metadata: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub is_snapshot_supported: bool,
}

/// Desired state of an Installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationSpec {
    /// Generated during the installation.
    #[serde(rename = "clusterID", default, skip_serializing_if = "String::is_empty")]
    pub cluster_id: String,
    #[serde(rename = "metricsBaseURL", default, skip_serializing_if = "String::is_empty")]
    pub metrics_base_url: String,
    #[serde(default)]
    pub air_gap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactsLocation>,
    /// The configuration used at installation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigSpec>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub end_user_k0s_config_overrides: String,
    /// Follows the pattern `appslug-channelslug`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub binary_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_info: Option<LicenseInfo>,
    /// Merge patch, as YAML, from `config` to the full desired
    /// configuration. Non-empty when the desired configuration has fields
    /// the writer's schema did not declare.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unknown_config_properties: String,
}

impl InstallationSpec {
    /// Record the difference between `config` and `new_config`, replacing
    /// any previously stored difference. Clears the field if they are equal.
    pub fn store_unknown_config_properties(
        &mut self,
        new_config: &RawDocument,
    ) -> ec_config::Result<()> {
        self.unknown_config_properties = unknown_fields::store(&self.config, new_config)?;
        Ok(())
    }

    /// [`Self::store_unknown_config_properties`] for YAML text.
    pub fn store_unknown_config_properties_yaml(
        &mut self,
        new_config: &str,
    ) -> ec_config::Result<()> {
        self.unknown_config_properties = unknown_fields::store_yaml(&self.config, new_config)?;
        Ok(())
    }

    /// Merge the stored unknown properties onto `config`, picking up any of
    /// them this version now understands.
    ///
    /// The stored properties are left in place, also when everything in
    /// them has become known.
    pub fn apply_unknown_config_properties(&mut self) -> ec_config::Result<ApplyOutcome> {
        unknown_fields::apply(&mut self.config, &self.unknown_config_properties)
    }
}

/// What follows is a list of all valid states for an Installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstallationState {
    Waiting,
    CopyingArtifacts,
    Enqueued,
    Installing,
    Installed,
    KubernetesInstalled,
    AddonsInstalling,
    HelmChartUpdateFailure,
    Obsolete,
    Failed,
    Unknown,
    PendingChartCreation,
    /// A state written by a version of the code that knows more states.
    Other(String),
}

impl InstallationState {
    pub fn as_str(&self) -> &str {
        match self {
            InstallationState::Waiting => "Waiting",
            InstallationState::CopyingArtifacts => "CopyingArtifacts",
            InstallationState::Enqueued => "Enqueued",
            InstallationState::Installing => "Installing",
            InstallationState::Installed => "Installed",
            InstallationState::KubernetesInstalled => "KubernetesInstalled",
            InstallationState::AddonsInstalling => "AddonsInstalling",
            InstallationState::HelmChartUpdateFailure => "HelmChartUpdateFailure",
            InstallationState::Obsolete => "Obsolete",
            InstallationState::Failed => "Failed",
            InstallationState::Unknown => "Unknown",
            InstallationState::PendingChartCreation => "PendingChartCreation",
            InstallationState::Other(s) => s,
        }
    }
}

impl From<&str> for InstallationState {
    fn from(s: &str) -> Self {
        match s {
            "Waiting" => InstallationState::Waiting,
            "CopyingArtifacts" => InstallationState::CopyingArtifacts,
            "Enqueued" => InstallationState::Enqueued,
            "Installing" => InstallationState::Installing,
            "Installed" => InstallationState::Installed,
            "KubernetesInstalled" => InstallationState::KubernetesInstalled,
            "AddonsInstalling" => InstallationState::AddonsInstalling,
            "HelmChartUpdateFailure" => InstallationState::HelmChartUpdateFailure,
            "Obsolete" => InstallationState::Obsolete,
            "Failed" => InstallationState::Failed,
            "Unknown" => InstallationState::Unknown,
            "PendingChartCreation" => InstallationState::PendingChartCreation,
            other => InstallationState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InstallationState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InstallationState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        Ok(InstallationState::from(s.as_str()))
    }
}

/// Observed state of an Installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes_status: Vec<NodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<InstallationState>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Charts that are being created or updated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_charts: Vec<String>,
}

impl InstallationStatus {
    pub fn set_state(
        &mut self,
        state: InstallationState,
        reason: impl Into<String>,
        pending_charts: Vec<String>,
    ) {
        self.state = Some(state);
        self.reason = reason.into();
        self.pending_charts = pending_charts;
    }

    /// Whether Kubernetes itself is up, regardless of addons.
    pub fn kubernetes_installed(&self) -> bool {
        matches!(
            self.state,
            Some(
                InstallationState::Installed
                    | InstallationState::KubernetesInstalled
                    | InstallationState::AddonsInstalling
                    | InstallationState::PendingChartCreation
                    | InstallationState::HelmChartUpdateFailure
            )
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: InstallationSpec,
    #[serde(default)]
    pub status: InstallationStatus,
}

impl Resource for Installation {
    const KIND: &'static str = "Installation";
}

impl Installation {
    pub fn new(name: impl Into<String>) -> Self {
        Installation {
            type_meta: Self::type_meta(),
            metadata: ObjectMeta {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Apply the stored unknown config properties, as a running instance
    /// does whenever it loads the record.
    ///
    /// A failure is also recorded as the `Failed` state, so that it is
    /// visible on the record rather than only to the caller.
    pub fn load_unknown_config_properties(&mut self) -> ec_config::Result<ApplyOutcome> {
        self.spec.apply_unknown_config_properties().map_err(|e| {
            warn!(
                installation = %self.metadata.name,
                error = %e,
                "could not apply unknown config properties"
            );
            self.status.set_state(
                InstallationState::Failed,
                format!("failed to apply unknown config properties: {}", e),
                Vec::new(),
            );
            e
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationList {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default)]
    pub metadata: ListMeta,
    pub items: Vec<Installation>,
}

impl Resource for InstallationList {
    const KIND: &'static str = "InstallationList";
}
