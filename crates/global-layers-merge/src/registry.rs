//! The function registry contract the merger works against.
//!
//! The host owns the function definitions. The merger only needs to list
//! names and borrow one definition mutably at a time.

use serde::{Deserialize, Serialize};

use crate::config::{FunctionName, LayerReference};

/// A single function definition with a lazily created `layers` list.
pub trait FunctionDefinition {
    /// Whether a `layers` list exists on this definition.
    fn has_layers(&self) -> bool;

    /// Create an empty `layers` list. Only called when [`has_layers`] is false.
    ///
    /// [`has_layers`]: FunctionDefinition::has_layers
    fn init_layers(&mut self);

    /// Append one reference to the end of the existing list.
    fn push_layer(&mut self, layer: &LayerReference);
}

/// Host-side registry of function definitions.
pub trait FunctionRegistry {
    type Function: FunctionDefinition + ?Sized;

    /// Lookup failure as reported by the host.
    type Error;

    /// All function names, in the order the host declares them.
    fn function_names(&self) -> Vec<FunctionName>;

    /// Borrow a definition for in-place mutation.
    fn function_mut(&mut self, name: &str) -> Result<&mut Self::Function, Self::Error>;
}

/// Errors from [`MemoryRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Function '{0}' is not defined in the service")]
    UnknownFunction(FunctionName),
}

/// Plain in-memory function definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryFunction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerReference>>,
}

impl MemoryFunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layers<I, L>(layers: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LayerReference>,
    {
        Self {
            layers: Some(layers.into_iter().map(Into::into).collect()),
        }
    }
}

impl FunctionDefinition for MemoryFunction {
    fn has_layers(&self) -> bool {
        self.layers.is_some()
    }

    fn init_layers(&mut self) {
        self.layers = Some(Vec::new());
    }

    fn push_layer(&mut self, layer: &LayerReference) {
        self.layers.get_or_insert_with(Vec::new).push(layer.clone());
    }
}

/// Ordered in-memory registry. Insertion order is declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryRegistry {
    functions: Vec<(FunctionName, MemoryFunction)>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<FunctionName>, function: MemoryFunction) {
        let name = name.into();
        match self.functions.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = function,
            None => self.functions.push((name, function)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MemoryFunction> {
        self.functions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemoryFunction)> {
        self.functions.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl<N: Into<FunctionName>> FromIterator<(N, MemoryFunction)> for MemoryRegistry {
    fn from_iter<I: IntoIterator<Item = (N, MemoryFunction)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (name, function) in iter {
            registry.insert(name, function);
        }
        registry
    }
}

impl FunctionRegistry for MemoryRegistry {
    type Function = MemoryFunction;
    type Error = RegistryError;

    fn function_names(&self) -> Vec<FunctionName> {
        self.functions.iter().map(|(n, _)| n.clone()).collect()
    }

    fn function_mut(&mut self, name: &str) -> Result<&mut MemoryFunction, RegistryError> {
        self.functions
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
            .ok_or_else(|| RegistryError::UnknownFunction(name.to_string()))
    }
}
