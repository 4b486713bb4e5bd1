// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging and Ctrl-C handling,
//   then hand off to `app::run`.
// - Every failure ends up as one `✗` line and an exit code from
//   `Error::exit_code`.

use std::io::{self, IsTerminal, Write};

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use tracing::warn;

use evasionhub_cli::app;
use evasionhub_cli::cli::Cli;
use evasionhub_cli::error::{EXIT_FAILURE, EXIT_OK};
use evasionhub_cli::interrupt;
use evasionhub_cli::logging;
use evasionhub_cli::ui::Printer;

fn main() {
    let code = run();
    let _ = io::stdout().flush();
    std::process::exit(code);
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_FAILURE,
            };
        }
    };

    let use_colour = !cli.no_colour && io::stdout().is_terminal();
    let mut out = Printer::stdout(use_colour);

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{e}");
    }
    if let Err(e) = interrupt::install(use_colour) {
        warn!("{e:#}");
    }

    if !cli.no_banner {
        out.banner();
    }

    match app::run(&cli.settings(), &mut out) {
        Ok(_) => EXIT_OK,
        Err(err) => {
            out.error(&err.to_string(), 0);
            if cli.verbose {
                out.trace(&err);
            }
            err.exit_code()
        }
    }
}
