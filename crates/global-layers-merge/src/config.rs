//! `custom.globalLayers` configuration types.
//!
//! Every field is optional. A missing block, a missing field, or a field of
//! the wrong shape all resolve to an empty list through [`layers_of`] and
//! [`excluded_of`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Name of a function as it appears under `functions` in the service.
pub type FunctionName = String;

/// Reference to a layer. Never validated: a plain string is usually an ARN,
/// anything else (such as `{Ref: SharedLambdaLayer}`) is an intrinsic the
/// deployment tool resolves later and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerReference {
    Name(String),
    Intrinsic(Value),
}

impl LayerReference {
    pub fn new(reference: impl Into<String>) -> Self {
        LayerReference::Name(reference.into())
    }

    /// The reference as a string, when it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LayerReference::Name(name) => Some(name),
            LayerReference::Intrinsic(_) => None,
        }
    }

    /// The reference as an untyped value.
    pub fn to_value(&self) -> Value {
        match self {
            LayerReference::Name(name) => Value::String(name.clone()),
            LayerReference::Intrinsic(value) => value.clone(),
        }
    }
}

impl From<&str> for LayerReference {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

impl From<String> for LayerReference {
    fn from(reference: String) -> Self {
        LayerReference::Name(reference)
    }
}

impl From<Value> for LayerReference {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => LayerReference::Name(name),
            other => LayerReference::Intrinsic(other),
        }
    }
}

impl fmt::Display for LayerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerReference::Name(name) => f.write_str(name),
            LayerReference::Intrinsic(value) => write!(f, "{}", value),
        }
    }
}

/// The `globalLayers` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLayersConfig {
    /// Layers appended to every selected function, in declaration order.
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub layers: Option<Vec<LayerReference>>,

    /// Functions that never receive global layers.
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub excluded_funcs: Option<Vec<FunctionName>>,
}

impl GlobalLayersConfig {
    /// Configured layers, empty when absent.
    pub fn layers(&self) -> &[LayerReference] {
        self.layers.as_deref().unwrap_or_default()
    }

    /// Excluded function names, empty when absent.
    pub fn excluded_funcs(&self) -> &[FunctionName] {
        self.excluded_funcs.as_deref().unwrap_or_default()
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_funcs().iter().any(|f| f == name)
    }
}

/// The service's `custom` block. Only `globalLayers` is read; everything
/// else belongs to other plugins and is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCustom {
    #[serde(
        default,
        rename = "globalLayers",
        deserialize_with = "lenient_block",
        skip_serializing_if = "Option::is_none"
    )]
    pub global_layers: Option<GlobalLayersConfig>,
}

impl ServiceCustom {
    /// Build from an untyped `custom` value. Anything that is not an object
    /// yields an empty block.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::Object(_) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring unreadable custom block");
                Self::default()
            }),
            other => {
                warn!(kind = value_kind(&other), "custom block is not a mapping, ignoring it");
                Self::default()
            }
        }
    }

    pub fn with_global_layers(config: GlobalLayersConfig) -> Self {
        Self {
            global_layers: Some(config),
        }
    }
}

/// `custom.globalLayers.layers`, or an empty slice.
pub fn layers_of(custom: &ServiceCustom) -> &[LayerReference] {
    custom
        .global_layers
        .as_ref()
        .map(GlobalLayersConfig::layers)
        .unwrap_or_default()
}

/// `custom.globalLayers.excludedFuncs`, or an empty slice.
pub fn excluded_of(custom: &ServiceCustom) -> &[FunctionName] {
    custom
        .global_layers
        .as_ref()
        .map(GlobalLayersConfig::excluded_funcs)
        .unwrap_or_default()
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let kind = value_kind(&value);
    match serde_json::from_value(value) {
        Ok(list) => Ok(Some(list)),
        Err(e) => {
            warn!(kind, error = %e, "expected a list, treating as absent");
            Ok(None)
        }
    }
}

fn lenient_block<'de, D>(deserializer: D) -> Result<Option<GlobalLayersConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::Object(_) => Ok(serde_json::from_value(value)
            .map_err(|e| warn!(error = %e, "unreadable globalLayers block, treating as absent"))
            .ok()),
        other => {
            warn!(kind = value_kind(&other), "globalLayers is not a mapping, treating as absent");
            Ok(None)
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
