// Diagnostic logging. Progress output is the `ui` printer's job; tracing is
// for the debug-level detail behind it and always goes to stderr so stdout
// stays clean.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: `warn` normally, `debug` with `--verbose`.
pub fn init(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter_layer = EnvFilter::new(format!("evasionhub_cli={level},warn"));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
