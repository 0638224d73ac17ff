//! Service manifest (`serverless.yml` / `serverless.json`)
//!
//! Loads the manifest into an order-preserving tree, exposes its functions
//! through the merge crate's registry contract, and writes it back out.
//!
//! The tree is the resolved document, not the source text: YAML merge keys
//! (`<<: *defaults`) and aliases are expanded on load and comments are not
//! kept. Output is semantically the input plus the appended layers, but a
//! YAML manifest written back is reformatted.

mod function;

pub use function::ManifestFunction;

use global_layers_merge::{FunctionName, FunctionRegistry, ServiceCustom};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FUNCTIONS_KEY: &str = "functions";
const CUSTOM_KEY: &str = "custom";

/// On-disk encoding of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// `.json` is JSON, everything else is treated as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ManifestFormat::Json,
            _ => ManifestFormat::Yaml,
        }
    }
}

/// Where a manifest was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSource {
    pub path: String,

    /// SHA-256 of the raw file bytes
    pub digest: String,
}

/// Errors that can occur when loading or writing a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Manifest file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    #[error("Failed to serialize manifest: {0}")]
    Serialize(String),

    #[error("'{0}' must be a mapping")]
    NotAMapping(String),

    #[error("Function names must be strings, found: {0}")]
    InvalidFunctionName(String),

    #[error("Function '{0}' must be a mapping")]
    InvalidFunction(FunctionName),

    #[error("Function '{0}' is not defined in the service")]
    UnknownFunction(FunctionName),
}

/// A loaded service manifest.
#[derive(Debug, Clone)]
pub struct ServiceManifest {
    format: ManifestFormat,
    source: Option<ManifestSource>,
    /// Root mapping. Its `functions` entry is stale; `functions` below is
    /// authoritative and spliced back in on output.
    document: Mapping,
    functions: Vec<(FunctionName, ManifestFunction)>,
}

impl ServiceManifest {
    /// Load a manifest from disk, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        let digest = hex::encode(Sha256::digest(&bytes));
        let text = String::from_utf8(bytes)
            .map_err(|e| ManifestError::Parse(format!("Invalid UTF-8: {}", e)))?;

        let mut manifest = Self::parse(&text, ManifestFormat::from_path(path))?;
        debug!(
            path = %path.display(),
            functions = manifest.functions.len(),
            "loaded service manifest"
        );
        manifest.source = Some(ManifestSource {
            path: path.to_string_lossy().to_string(),
            digest,
        });
        Ok(manifest)
    }

    /// Parse manifest text.
    pub fn parse(text: &str, format: ManifestFormat) -> Result<Self, ManifestError> {
        let document: Value = match format {
            ManifestFormat::Yaml => {
                let mut document: Value =
                    serde_yaml::from_str(text).map_err(|e| ManifestError::Parse(e.to_string()))?;
                // `<<: *defaults` keys are resolved so inherited layers count
                document
                    .apply_merge()
                    .map_err(|e| ManifestError::Parse(e.to_string()))?;
                document
            }
            // serde_yaml::Value keeps key order, serde_json::Value would not
            ManifestFormat::Json => {
                serde_json::from_str(text).map_err(|e| ManifestError::Parse(e.to_string()))?
            }
        };
        Self::from_document(document, format)
    }

    fn from_document(document: Value, format: ManifestFormat) -> Result<Self, ManifestError> {
        let Value::Mapping(document) = document else {
            return Err(ManifestError::NotAMapping("manifest root".to_string()));
        };

        let functions = match document.get(FUNCTIONS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Mapping(map)) => map
                .iter()
                .map(|(key, body)| read_function(key, body))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(ManifestError::NotAMapping(FUNCTIONS_KEY.to_string())),
        };

        Ok(Self {
            format,
            source: None,
            document,
            functions,
        })
    }

    pub fn format(&self) -> ManifestFormat {
        self.format
    }

    pub fn source(&self) -> Option<&ManifestSource> {
        self.source.as_ref()
    }

    /// The `custom` block as seen by the merger. Read fresh on every call.
    pub fn custom(&self) -> ServiceCustom {
        let Some(custom) = self.document.get(CUSTOM_KEY) else {
            return ServiceCustom::default();
        };
        match serde_json::to_value(custom) {
            Ok(value) => ServiceCustom::from_value(value),
            Err(e) => {
                warn!(error = %e, "custom block cannot be read, ignoring it");
                ServiceCustom::default()
            }
        }
    }

    pub fn function(&self, name: &str) -> Option<&ManifestFunction> {
        self.functions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// The full document with current function definitions.
    pub fn to_document(&self) -> Value {
        let mut document = self.document.clone();
        if let Some(Value::Mapping(_)) = document.get(FUNCTIONS_KEY) {
            let functions: Mapping = self
                .functions
                .iter()
                .map(|(name, f)| (Value::String(name.clone()), f.to_value()))
                .collect();
            document.insert(
                Value::String(FUNCTIONS_KEY.to_string()),
                Value::Mapping(functions),
            );
        }
        Value::Mapping(document)
    }

    /// Serialize in the manifest's own format.
    pub fn to_text(&self) -> Result<String, ManifestError> {
        let document = self.to_document();
        match self.format {
            ManifestFormat::Yaml => serde_yaml::to_string(&document)
                .map_err(|e| ManifestError::Serialize(e.to_string())),
            ManifestFormat::Json => serde_json::to_string_pretty(&document)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| ManifestError::Serialize(e.to_string())),
        }
    }

    /// Write to `path` in the manifest's own format.
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let text = self.to_text()?;
        fs::write(path, text)?;
        debug!(path = %path.display(), "wrote service manifest");
        Ok(())
    }
}

fn read_function(key: &Value, body: &Value) -> Result<(FunctionName, ManifestFunction), ManifestError> {
    let name = key
        .as_str()
        .ok_or_else(|| ManifestError::InvalidFunctionName(format!("{:?}", key)))?
        .to_string();
    let body = match body {
        Value::Null => None,
        Value::Mapping(m) => Some(m.clone()),
        _ => return Err(ManifestError::InvalidFunction(name)),
    };
    Ok((name, ManifestFunction::new(body)))
}

impl FunctionRegistry for ServiceManifest {
    type Function = ManifestFunction;
    type Error = ManifestError;

    fn function_names(&self) -> Vec<FunctionName> {
        self.functions.iter().map(|(n, _)| n.clone()).collect()
    }

    fn function_mut(&mut self, name: &str) -> Result<&mut ManifestFunction, ManifestError> {
        self.functions
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
            .ok_or_else(|| ManifestError::UnknownFunction(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use global_layers_merge::{apply_to_all, layers_of, FunctionDefinition};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SERVICE: &str = r#"service: orders
provider:
  name: aws
  runtime: nodejs18.x
custom:
  globalLayers:
    layers:
      - arn:aws:lambda:eu-west-1:123456789012:layer:shared:3
    excludedFuncs:
      - cron
functions:
  api:
    handler: src/api.handler
    memorySize: 512
  cron:
    handler: src/cron.handler
  worker:
"#;

    fn manifest() -> ServiceManifest {
        ServiceManifest::parse(SERVICE, ManifestFormat::Yaml).unwrap()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ManifestFormat::from_path(Path::new("serverless.yml")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(Path::new("serverless.yaml")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(Path::new("serverless.JSON")), ManifestFormat::Json);
        assert_eq!(ManifestFormat::from_path(Path::new("serverless")), ManifestFormat::Yaml);
    }

    #[test]
    fn test_function_names_in_document_order() {
        assert_eq!(manifest().function_names(), vec!["api", "cron", "worker"]);
    }

    #[test]
    fn test_custom_block() {
        let custom = manifest().custom();
        assert_eq!(layers_of(&custom).len(), 1);
        assert_eq!(
            layers_of(&custom)[0].as_str(),
            Some("arn:aws:lambda:eu-west-1:123456789012:layer:shared:3")
        );
    }

    #[test]
    fn test_no_custom_block() {
        let m = ServiceManifest::parse("service: bare\n", ManifestFormat::Yaml).unwrap();
        assert_eq!(m.custom(), ServiceCustom::default());
        assert!(m.function_names().is_empty());
    }

    #[test]
    fn test_null_function_body() {
        let m = manifest();
        let worker = m.function("worker").unwrap();
        assert!(worker.body().is_none());
        assert!(!worker.has_layers());
    }

    #[test]
    fn test_unknown_function() {
        let mut m = manifest();
        let err = m.function_mut("ghost").unwrap_err();
        assert!(matches!(err, ManifestError::UnknownFunction(ref n) if n == "ghost"));
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = ServiceManifest::parse("- a\n- b\n", ManifestFormat::Yaml).unwrap_err();
        assert!(matches!(err, ManifestError::NotAMapping(_)));

        let err = ServiceManifest::parse("just a string\n", ManifestFormat::Yaml).unwrap_err();
        assert!(matches!(err, ManifestError::NotAMapping(_)));
    }

    #[test]
    fn test_functions_must_be_mapping() {
        let err = ServiceManifest::parse("functions:\n  - api\n", ManifestFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("functions"));
    }

    #[test]
    fn test_function_body_must_be_mapping() {
        let err =
            ServiceManifest::parse("functions:\n  api: src/api.handler\n", ManifestFormat::Yaml)
                .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidFunction(ref n) if n == "api"));
    }

    #[test]
    fn test_parse_error() {
        let err = ServiceManifest::parse("service: [unclosed\n", ManifestFormat::Yaml).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn test_roundtrip_after_merge_keeps_order() {
        let mut m = manifest();
        let custom = m.custom();
        apply_to_all(&custom, &mut m).unwrap();

        let out: Value = serde_yaml::from_str(&m.to_text().unwrap()).unwrap();
        let root = out.as_mapping().unwrap();
        let keys: Vec<&str> = root.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["service", "provider", "custom", "functions"]);

        let functions = root.get("functions").unwrap().as_mapping().unwrap();
        let names: Vec<&str> = functions.keys().filter_map(Value::as_str).collect();
        assert_eq!(names, vec!["api", "cron", "worker"]);

        assert_eq!(functions.get("api").unwrap()["memorySize"].as_u64(), Some(512));
        assert_eq!(
            functions.get("api").unwrap()["layers"][0],
            Value::String("arn:aws:lambda:eu-west-1:123456789012:layer:shared:3".into())
        );
        assert!(functions.get("cron").unwrap().get("layers").is_none());
        assert!(functions.get("worker").unwrap()["layers"].is_sequence());
    }

    #[test]
    fn test_untouched_null_function_stays_null() {
        let m = manifest();
        let out = m.to_document();
        assert!(out["functions"]["worker"].is_null());
    }

    #[test]
    fn test_json_manifest() {
        let json = r#"{
  "service": "orders",
  "custom": {"globalLayers": {"layers": ["x"]}},
  "functions": {"zeta": {"handler": "z.h"}, "alpha": {}}
}"#;
        let mut m = ServiceManifest::parse(json, ManifestFormat::Json).unwrap();
        assert_eq!(m.function_names(), vec!["zeta", "alpha"]);

        let custom = m.custom();
        apply_to_all(&custom, &mut m).unwrap();

        let text = m.to_text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["functions"]["zeta"]["layers"], serde_json::json!(["x"]));
        assert_eq!(value["functions"]["alpha"]["layers"], serde_json::json!(["x"]));
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn test_load_records_source() {
        let mut temp = NamedTempFile::with_suffix(".yml").unwrap();
        write!(temp, "{}", SERVICE).unwrap();

        let m = ServiceManifest::load(temp.path()).unwrap();
        let source = m.source().unwrap();
        assert_eq!(source.digest.len(), 64);
        assert_eq!(source.path, temp.path().to_string_lossy());
        assert_eq!(m.format(), ManifestFormat::Yaml);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ServiceManifest::load(Path::new("/nonexistent/serverless.yml")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn test_write_and_reload() {
        let mut m = manifest();
        let custom = m.custom();
        apply_to_all(&custom, &mut m).unwrap();

        let out = NamedTempFile::with_suffix(".yml").unwrap();
        m.write(out.path()).unwrap();

        let reloaded = ServiceManifest::load(out.path()).unwrap();
        assert_eq!(
            reloaded.function("api").unwrap().layer_names(),
            Some(vec!["arn:aws:lambda:eu-west-1:123456789012:layer:shared:3"])
        );
        assert!(reloaded.function("cron").unwrap().layer_names().is_none());
    }

    const MERGE_KEYS: &str = r#"x-defaults: &defaults
  layers:
    - own
custom:
  globalLayers:
    layers:
      - global
functions:
  api:
    <<: *defaults
    handler: a.b
"#;

    #[test]
    fn test_merge_key_layers_are_inherited() {
        let mut m = ServiceManifest::parse(MERGE_KEYS, ManifestFormat::Yaml).unwrap();
        assert!(m.function("api").unwrap().has_layers());

        let custom = m.custom();
        apply_to_all(&custom, &mut m).unwrap();

        assert_eq!(m.function("api").unwrap().layer_names(), Some(vec!["own", "global"]));
        let text = m.to_text().unwrap();
        assert!(!text.contains("<<"));

        let reloaded = ServiceManifest::parse(&text, ManifestFormat::Yaml).unwrap();
        assert_eq!(
            reloaded.function("api").unwrap().layer_names(),
            Some(vec!["own", "global"])
        );
    }

    #[test]
    fn test_written_yaml_drops_comments() {
        let m = ServiceManifest::parse("# deploy notes\nservice: orders\n", ManifestFormat::Yaml)
            .unwrap();
        let text = m.to_text().unwrap();
        assert!(!text.contains("deploy notes"));
        assert!(text.contains("service: orders"));
    }
}
