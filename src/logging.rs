//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Filter directive for a base level raised by `-v` flags.
///
/// `-v` gives at least `info`, `-vv` and beyond give `debug`. A base level
/// that is already more verbose is kept.
pub fn filter_directive(base: &str, verbose: u8) -> String {
    match verbose {
        0 => base.to_string(),
        1 if matches!(base, "debug" | "trace") => base.to_string(),
        1 => "info".to_string(),
        _ if base == "trace" => base.to_string(),
        _ => "debug".to_string(),
    }
}

/// Install the global subscriber, writing to stderr. `RUST_LOG` takes
/// precedence over `directive` when set.
pub fn init(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
