// Command line surface. Parsing is kept separate from `main` so the flag
// handling can be unit tested.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::{ClientConfig, API_URL, DEFAULT_TIMEOUT_SECS};
use crate::app::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "evasionhub-cli",
    version,
    about = "EvasionHub API Client - Obfuscate Python files using evasionhub.com",
    after_help = "Examples:\n  evasionhub-cli script.py obfuscated.py\n  evasionhub-cli input.py output.py --verbose\n  evasionhub-cli ~/code/script.py ~/output/obfuscated.py"
)]
pub struct Cli {
    /// Path to input Python file
    pub input_file: PathBuf,

    /// Path to output obfuscated file
    pub output_file: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Disable coloured output
    #[arg(long = "no-colour", visible_alias = "no-color")]
    pub no_colour: bool,

    /// Skip the banner
    #[arg(long)]
    pub no_banner: bool,

    #[arg(long, hide = true, default_value = API_URL)]
    pub api_url: String,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            input: self.input_file.clone(),
            output: self.output_file.clone(),
            verbose: self.verbose,
            client: ClientConfig {
                api_url: self.api_url.clone(),
                timeout: Duration::from_secs(self.timeout),
                ..ClientConfig::default()
            },
        }
    }
}
