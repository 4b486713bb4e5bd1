// UI layer: everything the user sees on stdout. Formatting helpers are pure
// functions; `Printer` owns the colour switch and the output stream so the
// pipeline never reaches for a global.

use std::error::Error as StdError;
use std::fmt::Display;
use std::io::{self, Stdout, Write};
use std::path::Path;
use std::time::Duration;

use crossterm::style::{style, StyledContent, Stylize};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::app::Summary;

const KB: f64 = 1024.0;
const MB: f64 = 1024.0 * 1024.0;

/// Human readable byte count: bytes, then KB with one decimal, then MB with
/// two.
pub fn format_size(bytes: u64) -> String {
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.2} MB", b / MB)
    }
}

/// Durations under a second in whole milliseconds, otherwise seconds.
pub fn format_time(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else {
        format!("{seconds:.2}s")
    }
}

/// Output size relative to input size, e.g. `3.2x` or `0.7x`.
pub fn format_ratio(input: u64, output: u64) -> Option<String> {
    if input == 0 || output == 0 {
        return None;
    }
    let ratio = output as f64 / input as f64;
    if ratio >= 1.0 {
        Some(format!("{ratio:.1}x"))
    } else {
        Some(format!("0.{}x", (ratio * 10.0) as u32))
    }
}

/// Render a JSON value for display; strings lose their quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `compression_layers` -> `Compression Layers`
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Clone, Copy, Debug)]
enum Tone {
    Bold,
    Dim,
    Grey,
    Cyan,
    Yellow,
    Success,
    Error,
    Warning,
    Info,
    Heading,
    Frame,
    Highlight,
    Details,
}

impl Tone {
    fn apply<D: Display>(self, content: StyledContent<D>) -> StyledContent<D> {
        match self {
            Tone::Bold => content.bold(),
            Tone::Dim => content.dim(),
            Tone::Grey => content.dark_grey(),
            Tone::Cyan => content.cyan(),
            Tone::Yellow => content.yellow(),
            Tone::Success => content.green().bold(),
            Tone::Error | Tone::Frame => content.red().bold(),
            Tone::Warning | Tone::Highlight => content.yellow().bold(),
            Tone::Info => content.blue().bold(),
            Tone::Heading => content.white().bold(),
            Tone::Details => content.magenta().bold(),
        }
    }
}

/// Terminal printer. All progress, details and the final summary go
/// through here.
pub struct Printer<W: Write> {
    out: W,
    use_colour: bool,
}

impl Printer<Stdout> {
    pub fn stdout(use_colour: bool) -> Self {
        Printer::new(io::stdout(), use_colour)
    }
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, use_colour: bool) -> Self {
        Printer { out, use_colour }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: impl Display, tone: Tone) -> String {
        if self.use_colour {
            tone.apply(style(text)).to_string()
        } else {
            text.to_string()
        }
    }

    fn emit(&mut self, line: impl Display) {
        // Write failures on the terminal are ignored.
        let _ = writeln!(self.out, "{line}");
    }

    fn indent(level: usize) -> String {
        "  ".repeat(level)
    }

    /// Bold value, used for numbers and other figures inside messages.
    pub fn value(&self, value: impl Display) -> String {
        self.paint(value, Tone::Bold)
    }

    pub fn size(&self, bytes: u64) -> String {
        self.value(format_size(bytes))
    }

    pub fn time(&self, seconds: f64) -> String {
        self.value(format_time(seconds))
    }

    pub fn duration(&self, elapsed: Duration) -> String {
        self.time(elapsed.as_secs_f64())
    }

    pub fn path(&self, path: &Path) -> String {
        self.paint(path.display(), Tone::Frame)
    }

    pub fn banner(&mut self) {
        let title = self.paint("evasionhub", Tone::Frame);
        let subtitle = self.paint("Python Obfuscation API Client", Tone::Heading);
        let site = self.paint("evasionhub.com", Tone::Highlight);
        self.emit("");
        self.emit(format!("  {title} {} {subtitle}", self.paint("::", Tone::Grey)));
        self.emit(format!("  {site}"));
    }

    /// Step header, e.g. `▶ [2/4] Sending obfuscation request...`
    pub fn step(&mut self, step: usize, total: usize, description: &str) {
        let progress = self.paint(format!("▶ [{step}/{total}]"), Tone::Error);
        let description = self.paint(description, Tone::Heading);
        self.emit(format!("\n{progress} {description}"));
    }

    pub fn success(&mut self, message: &str, indent: usize) {
        let mark = self.paint("✓", Tone::Success);
        self.emit(format!("{}{mark} {message}", Self::indent(indent)));
    }

    pub fn error(&mut self, message: &str, indent: usize) {
        let mark = self.paint("✗", Tone::Error);
        self.emit(format!("{}{mark} {message}", Self::indent(indent)));
    }

    pub fn warning(&mut self, message: &str, indent: usize) {
        let mark = self.paint("⚠", Tone::Warning);
        self.emit(format!("{}{mark} {message}", Self::indent(indent)));
    }

    pub fn info(&mut self, message: &str, indent: usize) {
        let mark = self.paint("ℹ", Tone::Info);
        self.emit(format!("{}{mark} {message}", Self::indent(indent)));
    }

    /// `• label: value`
    pub fn detail(&mut self, label: &str, value: &str, indent: usize) {
        let bullet = self.paint("•", Tone::Grey);
        let label = self.paint(format!("{label}:"), Tone::Dim);
        self.emit(format!("{}{bullet} {label} {value}", Self::indent(indent)));
    }

    /// `▸ label: value`
    pub fn metric(&mut self, label: &str, value: &Value, indent: usize) {
        let bullet = self.paint("▸", Tone::Cyan);
        let value = self.value(display_value(value));
        self.emit(format!("{}{bullet} {label}: {value}", Self::indent(indent)));
    }

    /// Print the error's source chain, innermost last.
    pub fn trace(&mut self, err: &dyn StdError) {
        let header = self.paint("Stack trace:", Tone::Grey);
        self.emit(format!("\n{header}"));
        self.emit(format!("  {err}"));
        let mut source = err.source();
        while let Some(cause) = source {
            let caused_by = self.paint("caused by:", Tone::Grey);
            self.emit(format!("  {caused_by} {cause}"));
            source = cause.source();
        }
    }

    /// Spinner shown while waiting on the network. indicatif hides it when
    /// stderr is not a terminal.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Boxed end-of-run summary.
    pub fn summary(&mut self, summary: &Summary) {
        let bar = self.paint("│", Tone::Frame);
        let bullet = self.paint("•", Tone::Yellow);
        let detail_bullet = self.paint("•", Tone::Details);

        self.emit(format!(
            "\n{}{}{}",
            self.paint("╭─ ", Tone::Frame),
            self.paint("Obfuscation Complete", Tone::Heading),
            self.paint(" ─╮", Tone::Frame)
        ));
        self.emit(&bar);
        self.emit(format!(
            "{bar} {}  {}",
            self.paint("Input:", Tone::Heading),
            self.path(&summary.input)
        ));
        self.emit(format!(
            "{bar} {} {}",
            self.paint("Output:", Tone::Heading),
            self.path(&summary.output)
        ));
        self.emit(&bar);

        self.emit(format!("{bar} {}", self.paint("Performance:", Tone::Highlight)));
        self.emit(format!(
            "{bar}   {bullet} Processing time: {}",
            self.time(summary.processing_time)
        ));
        if let Some(ratio) = format_ratio(summary.input_size, summary.output_size) {
            self.emit(format!(
                "{bar}   {bullet} Size change: {} → {} ({})",
                self.size(summary.input_size),
                self.size(summary.output_size),
                self.value(ratio)
            ));
        }

        if !summary.stats.is_empty() {
            self.emit(&bar);
            self.emit(format!("{bar} {}", self.paint("Obfuscation Details:", Tone::Details)));
            for (key, label) in [
                ("compression_ratio", "Compression ratio"),
                ("mutation_id", "Mutation ID"),
                ("compression_layers", "Compression layers"),
            ] {
                if let Some(value) = summary.stats.get(key) {
                    self.emit(format!(
                        "{bar}   {detail_bullet} {label}: {}",
                        self.value(display_value(value))
                    ));
                }
            }
        }

        self.emit(&bar);
        self.emit(self.paint("╰─────────────────────────╯", Tone::Frame));
    }
}
