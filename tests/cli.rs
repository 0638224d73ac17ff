//! `global-layers` binary tests
//!
//! Each test runs in its own temporary working directory with HOME pointed
//! at it, so no user or repo settings leak in.

mod fixtures;

use fixtures::{FixtureCopy, OBSERVABILITY_LAYER};
use std::path::Path;
use std::process::{Command, Output};

fn global_layers(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_global-layers"))
        .args(args)
        .arg("--color")
        .arg("never")
        .current_dir(cwd)
        .env("HOME", cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run global-layers")
}

#[test]
fn test_package_prints_manifest_to_stdout() {
    let copy = FixtureCopy::new("serverless.yml");
    let output = global_layers(copy.dir.path(), &["package"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();

    assert!(stdout.contains(OBSERVABILITY_LAYER));
    assert!(stderr.contains("GlobalLayers: Adding global layers to listOrders"));
    assert!(stderr.contains("GlobalLayers: Function healthcheck is excluded from global layers"));
    // Manifest on disk is untouched without --in-place
    let original = std::fs::read_to_string(fixtures::fixture("serverless.yml")).unwrap();
    assert_eq!(copy.read(), original);
}

#[test]
fn test_deploy_function_in_place() {
    let copy = FixtureCopy::new("serverless.yml");
    let output = global_layers(
        copy.dir.path(),
        &["deploy-function", "--function", "nightlyReport", "--in-place"],
    );

    assert!(output.status.success());
    let manifest = serverless_global_layers::ServiceManifest::load(&copy.path).unwrap();
    assert!(manifest.function("nightlyReport").unwrap().layer_names().is_some());
    assert!(manifest.function("listOrders").unwrap().layer_names().is_none());
}

#[test]
fn test_show_json() {
    let copy = FixtureCopy::new("serverless.yml");
    let output = global_layers(copy.dir.path(), &["show", "--json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["excluded_funcs"], serde_json::json!(["healthcheck"]));
    assert_eq!(
        value["would_update"],
        serde_json::json!(["createOrder", "listOrders", "nightlyReport"])
    );
}

#[test]
fn test_missing_manifest_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let output = global_layers(dir.path(), &["package"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Manifest file not found"));
}

#[test]
fn test_repo_settings_select_manifest() {
    let copy = FixtureCopy::new("serverless.json");
    std::fs::write(
        copy.dir.path().join(".global-layers.toml"),
        "manifest = \"serverless.json\"\n",
    )
    .unwrap();

    let output = global_layers(copy.dir.path(), &["package", "--output", "out.json"]);

    assert!(output.status.success());
    let written = std::fs::read_to_string(copy.dir.path().join("out.json")).unwrap();
    assert!(written.contains("layer:tracing:1"));
}
