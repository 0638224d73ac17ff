//! Shared fixture helpers for integration tests.
//!
//! Fixture manifests live next to this file. Tests that write to a manifest
//! work on a copy inside a temporary directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const OBSERVABILITY_LAYER: &str = "arn:aws:lambda:eu-west-1:123456789012:layer:observability:7";
pub const SECRETS_LAYER: &str = "arn:aws:lambda:eu-west-1:123456789012:layer:secrets:2";
pub const ORDERS_DEPS_LAYER: &str = "arn:aws:lambda:eu-west-1:123456789012:layer:orders-deps:12";

/// Directory holding the fixture files
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Path to a fixture file
pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Copy a fixture into a fresh temporary directory
pub struct FixtureCopy {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl FixtureCopy {
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join(name);
        fs::copy(fixture(name), &path).expect("Failed to copy fixture");
        Self { dir, path }
    }

    pub fn read(&self) -> String {
        fs::read_to_string(&self.path).expect("Failed to read fixture copy")
    }
}
