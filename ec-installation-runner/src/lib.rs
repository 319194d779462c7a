//! File-based operations behind `ec-installation-runner`.
//!
//! These read and write Installation records as YAML (or JSON) files, which
//! is enough to exercise the unknown configuration properties round trip
//! without a control plane.

use std::path::Path;

use anyhow::{bail, Context, Result};
use ec_config::{codec, merge_patch, ApplyOutcome, RawDocument};
use ec_installation::{meta::TypeMeta, Installation, Resource, Scheme};
use tracing::{debug, info, info_span};

/// Read a YAML or JSON document from a file.
pub fn read_document(path: &Path) -> Result<RawDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    codec::from_yaml(&text).with_context(|| format!("could not parse {}", path.display()))
}

/// Read an Installation, checking its type against `scheme`.
pub fn read_installation(scheme: &Scheme, path: &Path) -> Result<Installation> {
    let doc = read_document(path)?;
    let type_meta: TypeMeta = serde_json::from_value(doc.clone())
        .with_context(|| format!("{} is not a record", path.display()))?;
    let kind = scheme.check(&type_meta)?;
    debug!(kind = kind.type_name, "recognized record type");
    if kind.kind != Installation::KIND {
        bail!(
            "{} holds a {}, expected an {}",
            path.display(),
            kind.kind,
            Installation::KIND
        );
    }
    serde_json::from_value(doc)
        .with_context(|| format!("could not decode Installation in {}", path.display()))
}

pub fn installation_to_yaml(installation: &Installation) -> Result<String> {
    let doc = codec::encode(installation)?;
    Ok(codec::to_yaml(&doc)?)
}

pub fn write_installation(installation: &Installation, path: &Path) -> Result<()> {
    let text = installation_to_yaml(installation)?;
    std::fs::write(path, text).with_context(|| format!("could not write {}", path.display()))
}

/// Record `new_config` as the desired configuration of the Installation in
/// `installation_path`, storing whatever `spec.config` cannot represent.
///
/// The typed configuration is replaced by the lenient decoding of
/// `new_config`, as a producer running this version of the schema would.
pub fn store(
    scheme: &Scheme,
    installation_path: &Path,
    new_config: &Path,
) -> Result<Installation> {
    let _span = info_span!("store", installation = %installation_path.display()).entered();

    let mut installation = read_installation(scheme, installation_path)?;
    let new_config = read_document(new_config)?;

    installation.spec.config = codec::decode(&new_config)
        .context("new configuration does not fit the configuration schema")?;
    installation
        .spec
        .store_unknown_config_properties(&new_config)
        .context("could not store unknown config properties")?;

    if installation.spec.unknown_config_properties.is_empty() {
        info!("configuration fully represented by the schema");
    } else {
        info!("stored unknown config properties");
    }
    Ok(installation)
}

/// Load the Installation in `installation_path` the way a running instance
/// does, applying its unknown config properties.
pub fn apply(scheme: &Scheme, installation_path: &Path) -> Result<(Installation, ApplyOutcome)> {
    let _span = info_span!("apply", installation = %installation_path.display()).entered();

    let mut installation = read_installation(scheme, installation_path)?;
    let outcome = installation
        .load_unknown_config_properties()
        .context("could not apply unknown config properties")?;
    info!(?outcome, "applied unknown config properties");
    Ok((installation, outcome))
}

/// The merge patch from `source` to `target`, as YAML.
pub fn diff(source: &Path, target: &Path) -> Result<String> {
    let source = read_document(source)?;
    let target = read_document(target)?;
    Ok(codec::to_yaml(&merge_patch::diff(&source, &target))?)
}

/// `document` with `patch` merged onto it, as YAML.
pub fn merge(document: &Path, patch: &Path) -> Result<String> {
    let document = read_document(document)?;
    let patch = read_document(patch)?;
    Ok(codec::to_yaml(&merge_patch::apply_patch(&document, &patch))?)
}
