// Library root
// -----------
// This crate exposes the pieces of the obfuscation client as a library. The
// binary (`main.rs`) parses arguments and hands off to `app::run`.
//
// Module responsibilities:
// - `files`: validates and reads the input file, writes the result.
// - `api`: blocking HTTP client for the obfuscation endpoint.
// - `response`: turns the JSON reply into a typed result.
// - `ui`: formatting helpers and the terminal printer.
// - `app`: the four-step pipeline tying the above together.
// - `cli`, `error`, `logging`, `interrupt`: argument parsing, the error
//   taxonomy with exit codes, tracing setup and Ctrl-C handling.
pub mod api;
pub mod app;
pub mod cli;
pub mod error;
pub mod files;
pub mod interrupt;
pub mod logging;
pub mod response;
pub mod ui;
