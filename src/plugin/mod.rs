//! GlobalLayers plugin
//!
//! Binds the merger to the two lifecycle events of the deployment tool:
//!
//! | Event                               | Action            |
//! |-------------------------------------|-------------------|
//! | `before:package:initialize`         | add to all        |
//! | `before:deploy:function:initialize` | add to `function` |
//!
//! The `custom` block is read from the service on every hook run.

mod sink;

pub use sink::{render, StyledSink};

use global_layers_merge::{
    FunctionRegistry, LayerMerger, MergeOutcome, NoticeSink, ServiceCustom,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::manifest::ServiceManifest;

/// A service the plugin can run against: a function registry plus its
/// `custom` block.
pub trait Service: FunctionRegistry {
    fn custom(&self) -> ServiceCustom;
}

impl Service for ServiceManifest {
    fn custom(&self) -> ServiceCustom {
        ServiceManifest::custom(self)
    }
}

/// Lifecycle events the plugin hooks into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    #[serde(rename = "before:package:initialize")]
    BeforePackageInitialize,

    #[serde(rename = "before:deploy:function:initialize")]
    BeforeDeployFunctionInitialize,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::BeforePackageInitialize => "before:package:initialize",
            LifecycleEvent::BeforeDeployFunctionInitialize => "before:deploy:function:initialize",
        }
    }

    pub fn action(&self) -> HookAction {
        match self {
            LifecycleEvent::BeforePackageInitialize => HookAction::AddToAll,
            LifecycleEvent::BeforeDeployFunctionInitialize => HookAction::AddToFunction,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HOOKS
            .iter()
            .map(|(event, _)| *event)
            .find(|event| event.as_str() == s)
            .ok_or_else(|| PluginError::UnknownHook(s.to_string()))
    }
}

/// What a hook does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookAction {
    AddToAll,
    AddToFunction,
}

/// The plugin's hook table.
pub const HOOKS: &[(LifecycleEvent, HookAction)] = &[
    (LifecycleEvent::BeforePackageInitialize, HookAction::AddToAll),
    (
        LifecycleEvent::BeforeDeployFunctionInitialize,
        HookAction::AddToFunction,
    ),
];

/// Command-line options the host passes to the plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Target of `deploy function`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl PluginOptions {
    pub fn for_function(name: impl Into<String>) -> Self {
        Self {
            function: Some(name.into()),
        }
    }
}

/// Plugin errors
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Unknown lifecycle event: '{0}'")]
    UnknownHook(String),

    #[error("{0}")]
    Service(Box<dyn std::error::Error + Send + Sync>),
}

/// The GlobalLayers plugin.
#[derive(Debug)]
pub struct GlobalLayersPlugin<S = StyledSink> {
    options: PluginOptions,
    merger: LayerMerger<S>,
}

impl<S: NoticeSink> GlobalLayersPlugin<S> {
    pub fn new(options: PluginOptions, sink: S) -> Self {
        Self {
            options,
            merger: LayerMerger::new(sink),
        }
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn hooks(&self) -> &'static [(LifecycleEvent, HookAction)] {
        HOOKS
    }

    pub fn into_sink(self) -> S {
        self.merger.into_sink()
    }

    /// Run the action bound to `event`.
    pub fn run_hook<V>(
        &mut self,
        event: LifecycleEvent,
        service: &mut V,
    ) -> Result<MergeOutcome, PluginError>
    where
        V: Service + ?Sized,
        V::Error: std::error::Error + Send + Sync + 'static,
    {
        debug!(%event, "running hook");
        match event.action() {
            HookAction::AddToAll => self.add_to_all(service),
            HookAction::AddToFunction => self.add_to_function(service),
        }
    }

    /// Run a hook by its event name.
    pub fn run_named_hook<V>(
        &mut self,
        event: &str,
        service: &mut V,
    ) -> Result<MergeOutcome, PluginError>
    where
        V: Service + ?Sized,
        V::Error: std::error::Error + Send + Sync + 'static,
    {
        let event: LifecycleEvent = event.parse()?;
        self.run_hook(event, service)
    }

    /// Apply the global layers to every function of the service.
    pub fn add_to_all<V>(&mut self, service: &mut V) -> Result<MergeOutcome, PluginError>
    where
        V: Service + ?Sized,
        V::Error: std::error::Error + Send + Sync + 'static,
    {
        let custom = service.custom();
        self.merger
            .apply_to_all(&custom, service)
            .map_err(|e| PluginError::Service(Box::new(e)))
    }

    /// Apply the global layers to the function named in the options. Does
    /// nothing when no function was given.
    pub fn add_to_function<V>(&mut self, service: &mut V) -> Result<MergeOutcome, PluginError>
    where
        V: Service + ?Sized,
        V::Error: std::error::Error + Send + Sync + 'static,
    {
        let custom = service.custom();
        self.merger
            .apply_to_one(&custom, self.options.function.as_deref(), service)
            .map_err(|e| PluginError::Service(Box::new(e)))
    }
}
