//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Manifest path (default: "serverless.yml")
    pub manifest: String,

    /// Colour mode (default: "auto")
    pub color: String,

    /// Log filter directive (default: "warn")
    pub log_filter: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            manifest: "serverless.yml".to_string(),
            color: "auto".to_string(),
            log_filter: "warn".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a JSON value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "manifest": self.manifest,
            "color": self.color,
            "log": {
                "filter": self.log_filter
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.manifest, "serverless.yml");
        assert_eq!(defaults.color, "auto");
        assert_eq!(defaults.log_filter, "warn");
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();
        assert_eq!(value["manifest"], "serverless.yml");
        assert_eq!(value["log"]["filter"], "warn");
    }
}
