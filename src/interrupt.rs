// Ctrl-C handling. The pipeline is a single blocking call chain, so the
// interrupt is served from a watcher thread that reports and exits the
// process directly.

use anyhow::Result;

use crate::error::Error;
use crate::ui::Printer;

/// Start watching for SIGINT. On delivery the cancellation message is
/// printed and the process exits with the interrupt status.
#[cfg(unix)]
pub fn install(use_colour: bool) -> Result<()> {
    use anyhow::Context;
    use signal_hook::consts::SIGINT;
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT]).context("failed to register SIGINT handler")?;
    std::thread::Builder::new()
        .name("sigint".into())
        .spawn(move || {
            if signals.forever().next().is_some() {
                cancel(use_colour);
            }
        })
        .context("failed to spawn signal thread")?;
    Ok(())
}

#[cfg(not(unix))]
pub fn install(_use_colour: bool) -> Result<()> {
    Ok(())
}

#[cfg_attr(not(unix), allow(dead_code))]
fn cancel(use_colour: bool) -> ! {
    let err = Error::Interrupted;
    let mut out = Printer::stdout(use_colour);
    out.error(&err.to_string(), 0);
    std::process::exit(err.exit_code());
}
