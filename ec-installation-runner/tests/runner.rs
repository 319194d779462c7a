use std::{fs, path::PathBuf};

use ec_config::{codec, ApplyOutcome};
use ec_installation::{installation_scheme, InstallationState};
use ec_installation_runner as runner;
use serde_json::json;
use tempfile::TempDir;

const INSTALLATION: &str = r#"
apiVersion: embeddedcluster.replicated.com/v1beta1
kind: Installation
metadata:
  name: "20240101000000"
spec:
  clusterID: cluster-a1
  config:
    version: 1.0.0
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn store_keeps_unknown_fields_as_patch() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();
    let installation = write(&dir, "installation.yaml", INSTALLATION);
    let config = write(
        &dir,
        "config.yaml",
        "version: 2.0.0\nnetwork:\n  podCIDR: 10.244.0.0/16\n",
    );

    let result = runner::store(&scheme, &installation, &config).unwrap();

    assert_eq!(result.spec.config.as_ref().unwrap().version, "2.0.0");
    assert_eq!(
        codec::from_yaml(&result.spec.unknown_config_properties).unwrap(),
        json!({"network": {"podCIDR": "10.244.0.0/16"}})
    );
    assert_eq!(result.spec.cluster_id, "cluster-a1");
}

#[test]
fn store_without_unknown_fields_leaves_patch_empty() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();
    let installation = write(&dir, "installation.yaml", INSTALLATION);
    let config = write(&dir, "config.json", r#"{"version": "1.1.0"}"#);

    let result = runner::store(&scheme, &installation, &config).unwrap();

    assert_eq!(result.spec.config.unwrap().version, "1.1.0");
    assert_eq!(result.spec.unknown_config_properties, "");
}

#[test]
fn written_installation_reads_back() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();
    let installation = write(&dir, "installation.yaml", INSTALLATION);
    let config = write(&dir, "config.yaml", "version: 2.0.0\nextra: true\n");

    let stored = runner::store(&scheme, &installation, &config).unwrap();
    runner::write_installation(&stored, &installation).unwrap();

    let reread = runner::read_installation(&scheme, &installation).unwrap();
    assert_eq!(reread, stored);
}

#[test]
fn apply_merges_patch_into_config() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();
    let installation = write(
        &dir,
        "installation.yaml",
        &format!(
            "{}  unknownConfigProperties: |\n    binaryOverrideUrl: https://example.com/bin\n",
            INSTALLATION
        ),
    );

    let (result, outcome) = runner::apply(&scheme, &installation).unwrap();

    assert_eq!(outcome, ApplyOutcome::Updated);
    let config = result.spec.config.unwrap();
    assert_eq!(config.version, "1.0.0");
    assert_eq!(config.binary_override_url, "https://example.com/bin");
}

#[test]
fn apply_without_patch_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();
    let installation = write(&dir, "installation.yaml", INSTALLATION);

    let (result, outcome) = runner::apply(&scheme, &installation).unwrap();

    assert_eq!(outcome, ApplyOutcome::NoPatch);
    assert_eq!(result.spec.config.unwrap().version, "1.0.0");
}

#[test]
fn apply_with_malformed_patch_fails() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();
    let installation = write(
        &dir,
        "installation.yaml",
        &format!("{}  unknownConfigProperties: \"a: [unclosed\"\n", INSTALLATION),
    );

    let err = runner::apply(&scheme, &installation).unwrap_err();
    assert!(format!("{:#}", err).contains("could not apply unknown config properties"));
}

#[test]
fn other_kinds_are_rejected() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();

    let list = write(
        &dir,
        "list.yaml",
        "apiVersion: embeddedcluster.replicated.com/v1beta1\nkind: InstallationList\nitems: []\n",
    );
    let err = runner::read_installation(&scheme, &list).unwrap_err();
    assert!(err.to_string().contains("expected an Installation"));

    let unknown = write(
        &dir,
        "config.yaml",
        "apiVersion: embeddedcluster.replicated.com/v1beta1\nkind: Config\n",
    );
    let err = runner::read_installation(&scheme, &unknown).unwrap_err();
    assert!(err.to_string().contains("unrecognized record type"));
}

#[test]
fn missing_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();
    let missing = dir.path().join("nope.yaml");
    let err = runner::read_installation(&scheme, &missing).unwrap_err();
    assert!(err.to_string().contains("nope.yaml"));
}

#[test]
fn diff_then_merge_reaches_target() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "source.yaml", "a: 1\nb:\n  c: 2\n  d: 3\n");
    let target = write(&dir, "target.yaml", "a: 1\nb:\n  c: 4\ne: [1, 2]\n");

    let patch_text = runner::diff(&source, &target).unwrap();
    assert_eq!(
        codec::from_yaml(&patch_text).unwrap(),
        json!({"b": {"c": 4, "d": null}, "e": [1, 2]})
    );

    let patch = write(&dir, "patch.yaml", &patch_text);
    let merged = runner::merge(&source, &patch).unwrap();
    assert_eq!(
        codec::from_yaml(&merged).unwrap(),
        codec::from_yaml(&fs::read_to_string(&target).unwrap()).unwrap()
    );
}

#[test]
fn stored_state_survives_round_trip() {
    let dir = TempDir::new().unwrap();
    let scheme = installation_scheme().unwrap();
    let installation = write(
        &dir,
        "installation.yaml",
        &format!("{}status:\n  state: Installed\n", INSTALLATION),
    );

    let read = runner::read_installation(&scheme, &installation).unwrap();
    assert_eq!(read.status.state, Some(InstallationState::Installed));
    assert!(runner::installation_to_yaml(&read)
        .unwrap()
        .contains("state: Installed"));
}
