//! A function entry under `functions` in the service manifest.

use global_layers_merge::{FunctionDefinition, LayerReference};
use serde_yaml::{Mapping, Value};

const LAYERS_KEY: &str = "layers";

/// Function body as written in the manifest. `hello:` with nothing under it
/// is kept as `None` and only turned into a mapping when written to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManifestFunction {
    body: Option<Mapping>,
}

impl ManifestFunction {
    pub fn new(body: Option<Mapping>) -> Self {
        Self { body }
    }

    pub fn body(&self) -> Option<&Mapping> {
        self.body.as_ref()
    }

    /// The `layers` value, if present and not falsy (`null`, `false`, `0`,
    /// `""`).
    pub fn layers(&self) -> Option<&Value> {
        self.body
            .as_ref()
            .and_then(|m| m.get(LAYERS_KEY))
            .filter(|v| !is_falsy(v))
    }

    /// String entries of `layers`, skipping intrinsic references such as
    /// `{Ref: MyLayer}`.
    pub fn layer_names(&self) -> Option<Vec<&str>> {
        match self.layers()? {
            Value::Sequence(seq) => Some(seq.iter().filter_map(Value::as_str).collect()),
            other => Some(other.as_str().into_iter().collect()),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        match &self.body {
            Some(m) => Value::Mapping(m.clone()),
            None => Value::Null,
        }
    }

    fn layers_entry(&mut self) -> &mut Value {
        self.body
            .get_or_insert_with(Mapping::new)
            .entry(Value::String(LAYERS_KEY.to_string()))
            .or_insert(Value::Null)
    }
}

impl FunctionDefinition for ManifestFunction {
    fn has_layers(&self) -> bool {
        self.layers().is_some()
    }

    fn init_layers(&mut self) {
        *self.layers_entry() = Value::Sequence(Vec::new());
    }

    fn push_layer(&mut self, layer: &LayerReference) {
        let entry = self.layers_entry();
        if is_falsy(entry) {
            *entry = Value::Sequence(Vec::new());
        } else if !entry.is_sequence() {
            // A lone scalar becomes the first element
            let existing = std::mem::replace(entry, Value::Null);
            *entry = Value::Sequence(vec![existing]);
        }
        if let Value::Sequence(seq) = entry {
            seq.push(layer_value(layer));
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn layer_value(layer: &LayerReference) -> Value {
    match layer {
        LayerReference::Name(name) => Value::String(name.clone()),
        LayerReference::Intrinsic(value) => from_json(value),
    }
}

fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else {
                Value::Number(n.as_f64().unwrap_or_default().into())
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Sequence(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (Value::String(k.clone()), from_json(v)))
                .collect(),
        ),
    }
}
