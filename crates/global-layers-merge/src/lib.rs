//! Global layer merging for serverless function definitions.
//!
//! Layers listed under `custom.globalLayers.layers` are appended to the
//! `layers` list of every function, or of one selected function, except those
//! named in `custom.globalLayers.excludedFuncs`.
//!
//! Appending is additive and not idempotent: running a merge twice on the
//! same definitions appends the global layers twice.

mod config;
mod notice;
mod registry;
mod result;

pub use config::{
    excluded_of, layers_of, FunctionName, GlobalLayersConfig, LayerReference, ServiceCustom,
};
pub use notice::{Notice, NoticeSink, TracingSink, LOG_PREFIX};
pub use registry::{
    FunctionDefinition, FunctionRegistry, MemoryFunction, MemoryRegistry, RegistryError,
};
pub use result::MergeOutcome;

use tracing::debug;

/// Applies the global layers configuration to a function registry.
///
/// The configuration is passed to each call and never cached, so a merger
/// can be reused across invocations against a changing service.
#[derive(Debug, Default)]
pub struct LayerMerger<S = TracingSink> {
    sink: S,
}

impl<S: NoticeSink> LayerMerger<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Append the global layers to every non-excluded function, in the order
    /// the registry lists them.
    pub fn apply_to_all<R>(
        &mut self,
        custom: &ServiceCustom,
        registry: &mut R,
    ) -> Result<MergeOutcome, R::Error>
    where
        R: FunctionRegistry + ?Sized,
    {
        let layers = layers_of(custom);
        if layers.is_empty() {
            self.sink.notice(Notice::NoGlobalLayers);
            return Ok(MergeOutcome::unconfigured(None));
        }

        let excluded = excluded_of(custom);
        debug!(layers = layers.len(), excluded = excluded.len(), "applying global layers to all functions");

        let mut outcome = MergeOutcome::configured(None);
        for name in registry.function_names() {
            if excluded.contains(&name) {
                self.sink.notice(Notice::Excluded(name.clone()));
                outcome.excluded.push(name);
                continue;
            }

            let function = registry.function_mut(&name)?;
            self.sink.notice(Notice::Adding(name.clone()));
            append_layers(function, layers);
            outcome.updated.push(name);
        }

        Ok(outcome)
    }

    /// Append the global layers to a single function.
    ///
    /// `None` means no function was selected; nothing happens and no notice
    /// is emitted.
    pub fn apply_to_one<R>(
        &mut self,
        custom: &ServiceCustom,
        name: Option<&str>,
        registry: &mut R,
    ) -> Result<MergeOutcome, R::Error>
    where
        R: FunctionRegistry + ?Sized,
    {
        let Some(name) = name else {
            return Ok(MergeOutcome::no_target());
        };
        let target = Some(name.to_string());

        let layers = layers_of(custom);
        if layers.is_empty() {
            self.sink.notice(Notice::NoGlobalLayers);
            return Ok(MergeOutcome::unconfigured(target));
        }

        let mut outcome = MergeOutcome::configured(target);
        if excluded_of(custom).iter().any(|f| f == name) {
            self.sink.notice(Notice::Excluded(name.to_string()));
            outcome.excluded.push(name.to_string());
            return Ok(outcome);
        }

        self.sink.notice(Notice::Adding(name.to_string()));
        let function = registry.function_mut(name)?;
        append_layers(function, layers);
        outcome.updated.push(name.to_string());

        Ok(outcome)
    }
}

/// Concatenate `layers` after whatever the function already has, creating
/// the list first when absent.
pub fn append_layers<F>(function: &mut F, layers: &[LayerReference])
where
    F: FunctionDefinition + ?Sized,
{
    if !function.has_layers() {
        function.init_layers();
    }
    for layer in layers {
        function.push_layer(layer);
    }
}

/// [`LayerMerger::apply_to_all`] with notices sent to `tracing`.
pub fn apply_to_all<R>(custom: &ServiceCustom, registry: &mut R) -> Result<MergeOutcome, R::Error>
where
    R: FunctionRegistry + ?Sized,
{
    LayerMerger::new(TracingSink).apply_to_all(custom, registry)
}

/// [`LayerMerger::apply_to_one`] with notices sent to `tracing`.
pub fn apply_to_one<R>(
    custom: &ServiceCustom,
    name: Option<&str>,
    registry: &mut R,
) -> Result<MergeOutcome, R::Error>
where
    R: FunctionRegistry + ?Sized,
{
    LayerMerger::new(TracingSink).apply_to_one(custom, name, registry)
}
