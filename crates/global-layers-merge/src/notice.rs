//! Informational notices emitted while merging.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::config::FunctionName;

/// Prefix every rendered notice carries.
pub const LOG_PREFIX: &str = "GlobalLayers:";

/// One thing the merger did or decided not to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "function")]
pub enum Notice {
    #[serde(rename = "NO_GLOBAL_LAYERS")]
    NoGlobalLayers,

    #[serde(rename = "EXCLUDED")]
    Excluded(FunctionName),

    #[serde(rename = "ADDING")]
    Adding(FunctionName),
}

impl Notice {
    /// The function the notice is about, if any.
    pub fn function(&self) -> Option<&str> {
        match self {
            Notice::NoGlobalLayers => None,
            Notice::Excluded(name) | Notice::Adding(name) => Some(name),
        }
    }

    /// Render the message, passing the function name through `highlight`.
    pub fn render_with(&self, highlight: impl Fn(&str) -> String) -> String {
        match self {
            Notice::NoGlobalLayers => "No global layers are configured".to_string(),
            Notice::Excluded(name) => {
                format!("Function {} is excluded from global layers", highlight(name))
            }
            Notice::Adding(name) => format!("Adding global layers to {}", highlight(name)),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(str::to_string))
    }
}

/// Receiver for notices. Purely observational.
pub trait NoticeSink {
    fn notice(&mut self, notice: Notice);
}

impl NoticeSink for Vec<Notice> {
    fn notice(&mut self, notice: Notice) {
        self.push(notice);
    }
}

impl<S: NoticeSink + ?Sized> NoticeSink for &mut S {
    fn notice(&mut self, notice: Notice) {
        (**self).notice(notice);
    }
}

impl<S: NoticeSink + ?Sized> NoticeSink for Box<S> {
    fn notice(&mut self, notice: Notice) {
        (**self).notice(notice);
    }
}

/// Sends every notice to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NoticeSink for TracingSink {
    fn notice(&mut self, notice: Notice) {
        match notice.function() {
            Some(function) => info!(function, "{} {}", LOG_PREFIX, notice),
            None => info!("{} {}", LOG_PREFIX, notice),
        }
    }
}
