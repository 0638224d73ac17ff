//! Run report
//!
//! Machine-readable record of one hook run: which event fired, against which
//! manifest (path and digest), with which global layers, and what changed.

use chrono::{DateTime, Utc};
use global_layers_merge::{
    excluded_of, layers_of, FunctionName, LayerReference, MergeOutcome, ServiceCustom,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::manifest::ManifestSource;
use crate::plugin::LifecycleEvent;

/// Schema version for run reports
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "global-layers/run_report@1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_version: u32,

    pub schema_id: String,

    pub created_at: DateTime<Utc>,

    /// Lifecycle event that fired
    pub event: LifecycleEvent,

    /// Manifest the run was applied to (None for in-memory services)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestSource>,

    /// Global layers in effect
    pub layers: Vec<LayerReference>,

    /// Exclusions in effect
    pub excluded_funcs: Vec<FunctionName>,

    pub outcome: MergeOutcome,
}

impl RunReport {
    pub fn new(
        event: LifecycleEvent,
        custom: &ServiceCustom,
        manifest: Option<&ManifestSource>,
        outcome: MergeOutcome,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            event,
            manifest: manifest.cloned(),
            layers: layers_of(custom).to_vec(),
            excluded_funcs: excluded_of(custom).to_vec(),
            outcome,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}
