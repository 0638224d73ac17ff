//! Serverless Global Layers - shared Lambda layers for every function
//!
//! This crate implements the GlobalLayers plugin for serverless services:
//! layers declared once under `custom.globalLayers.layers` are appended to
//! each function's `layers` list at package time, or to a single function
//! at `deploy function` time, except for functions listed under
//! `custom.globalLayers.excludedFuncs`.

pub mod config;
pub mod logging;
pub mod manifest;
pub mod plugin;
pub mod report;

pub use global_layers_merge as merge;

pub use config::{EffectiveSettings, Settings};
pub use manifest::{ManifestError, ManifestFormat, ServiceManifest};
pub use merge::{GlobalLayersConfig, LayerReference, MergeOutcome, Notice, ServiceCustom};
pub use plugin::{GlobalLayersPlugin, LifecycleEvent, PluginError, PluginOptions, StyledSink};
pub use report::RunReport;
