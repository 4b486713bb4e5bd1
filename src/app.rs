// Orchestrator: the four-step pipeline. Each step blocks until it is done
// and any error aborts the run, so the output file is only touched after
// the response has been parsed successfully.

use std::io::Write;
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::info;

use crate::api::{payload_size, ApiClient, ClientConfig};
use crate::error::Error;
use crate::files::{check_input, is_large, read_checked, write_output};
use crate::response::parse_response;
use crate::ui::{title_case, Printer};

const TOTAL_STEPS: usize = 4;

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub verbose: bool,
    pub client: ClientConfig,
}

/// What the final summary box shows.
#[derive(Debug, Clone)]
pub struct Summary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub processing_time: f64,
    pub stats: Map<String, Value>,
    pub input_size: u64,
    pub output_size: u64,
}

/// Run the pipeline and print the summary. Errors are returned unprinted;
/// the caller decides how to report them.
pub fn run<W: Write>(settings: &Settings, out: &mut Printer<W>) -> Result<Summary, Error> {
    // 1: read
    out.step(1, TOTAL_STEPS, "Reading input...");
    let size = check_input(&settings.input)?;
    if is_large(size) {
        let size = out.size(size);
        out.warning(&format!("Large file detected: {size}"), 1);
    }
    let source = read_checked(&settings.input, size)?;
    let message = format!("Read input file: {}", out.path(&settings.input));
    out.success(&message, 1);
    let (size, lines) = (out.size(source.size), out.value(source.line_count()));
    out.detail("File size", &size, 2);
    out.detail("Lines", &lines, 2);
    let input_size = source.text.len() as u64;

    // 2: send
    out.step(2, TOTAL_STEPS, "Sending obfuscation request...");
    let client = ApiClient::new(settings.client.clone())?;
    let config = client.config();
    out.info("Sending obfuscation request...", 1);
    let (endpoint, payload) = (out.value(&config.api_url), out.size(payload_size(&source.text) as u64));
    out.detail("API endpoint", &endpoint, 2);
    out.detail("Payload size", &payload, 2);
    if settings.verbose {
        let (agent, timeout) = (out.value(&config.user_agent), out.duration(config.timeout));
        out.detail("User-Agent", &agent, 2);
        out.detail("Timeout", &timeout, 2);
    }

    let spinner = out.spinner(&waiting_message(&client));
    let reply = client.send(&source.text);
    spinner.finish_and_clear();
    let reply = reply?;

    // Reported before the status is judged, so failures show it too.
    let message = format!("Request completed in {}", out.duration(reply.elapsed));
    out.success(&message, 1);
    if settings.verbose {
        let status = out.value(reply.status.as_u16());
        let bytes = out.size(reply.response_bytes() as u64);
        out.detail("Status code", &status, 2);
        out.detail("Response size", &bytes, 2);
    }
    let body = reply.into_json()?;

    // 3: parse
    out.step(3, TOTAL_STEPS, "Processing response...");
    let result = parse_response(&body)?;
    out.success("API response parsed successfully", 1);
    let (time, size) = (out.time(result.processing_time), out.size(result.code.len() as u64));
    out.detail("Processing time", &time, 2);
    out.detail("Output size", &size, 2);
    if settings.verbose && !result.stats.is_empty() {
        out.info("Obfuscation statistics:", 1);
        for (key, value) in &result.stats {
            out.metric(&title_case(key), value, 2);
        }
    }

    // 4: write
    out.step(4, TOTAL_STEPS, "Writing output file...");
    let output_size = write_output(&settings.output, &result.code)?;
    let message = format!("Obfuscated code written to: {}", out.path(&settings.output));
    out.success(&message, 1);
    let (size, lines) = (out.size(output_size), out.value(result.code.lines().count()));
    out.detail("Output size", &size, 2);
    out.detail("Lines", &lines, 2);

    info!(
        input = %settings.input.display(),
        output = %settings.output.display(),
        input_size,
        output_size,
        "obfuscation complete"
    );

    let summary = Summary {
        input: settings.input.clone(),
        output: settings.output.clone(),
        processing_time: result.processing_time,
        stats: result.stats,
        input_size,
        output_size,
    };
    out.summary(&summary);
    Ok(summary)
}

fn waiting_message(client: &ApiClient) -> String {
    format!("Waiting for {}...", client.host())
}
