//! Terminal rendering of merge notices.

use console::style;
use global_layers_merge::{Notice, NoticeSink, LOG_PREFIX};
use std::io::{self, Stderr, Write};
use tracing::warn;

/// Writes `GlobalLayers: <message>` lines, prefix in cyan and function
/// names in green when colour is enabled for stderr.
#[derive(Debug)]
pub struct StyledSink<W = Stderr> {
    out: W,
}

impl StyledSink<Stderr> {
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> StyledSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render a notice the way [`StyledSink`] prints it, without the newline.
pub fn render(notice: &Notice) -> String {
    format!(
        "{} {}",
        style(LOG_PREFIX).cyan().for_stderr(),
        notice.render_with(|name| style(name).green().for_stderr().to_string())
    )
}

impl<W: Write> NoticeSink for StyledSink<W> {
    fn notice(&mut self, notice: Notice) {
        if let Err(e) = writeln!(self.out, "{}", render(&notice)) {
            warn!(error = %e, "failed to write notice");
        }
    }
}
