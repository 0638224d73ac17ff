//! Tool settings
//!
//! Settings for the `global-layers` binary are merged from four layers:
//! 1. Built-in defaults
//! 2. User file (~/.config/global-layers/config.toml)
//! 3. Repo file (.global-layers.toml)
//! 4. CLI flags
//!
//! The `custom.globalLayers` block itself lives in the service manifest and
//! is not part of these settings.

mod defaults;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use merge::{deep_merge, merge_layers};
pub use settings::{
    ColorMode, ConfigError, ConfigOrigin, ConfigSource, EffectiveSettings, LogSettings, Settings,
    REPO_SETTINGS_FILE,
};
