//! Merge result types.

use serde::{Deserialize, Serialize};

use crate::config::FunctionName;

/// What a single merge invocation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Whether any global layers were configured.
    pub layers_configured: bool,

    /// Target of a single-function run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<FunctionName>,

    /// Functions that received the global layers, in processing order.
    #[serde(default)]
    pub updated: Vec<FunctionName>,

    /// Functions skipped because they are excluded.
    #[serde(default)]
    pub excluded: Vec<FunctionName>,
}

impl MergeOutcome {
    /// Single-function run with no target selected.
    pub fn no_target() -> Self {
        Self::default()
    }

    /// Run that stopped because no layers are configured.
    pub fn unconfigured(target: Option<FunctionName>) -> Self {
        Self {
            layers_configured: false,
            target,
            ..Self::default()
        }
    }

    pub(crate) fn configured(target: Option<FunctionName>) -> Self {
        Self {
            layers_configured: true,
            target,
            ..Self::default()
        }
    }

    /// True when no function was modified.
    pub fn is_noop(&self) -> bool {
        self.updated.is_empty()
    }

    pub fn was_updated(&self, name: &str) -> bool {
        self.updated.iter().any(|n| n == name)
    }

    pub fn was_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|n| n == name)
    }
}
