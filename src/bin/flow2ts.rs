//! CLI entry point for the Flow-to-TypeScript converter
//!
//! Usage: flow2ts [options] <patterns...>
//!
//! Parse and format errors are reported per file while the batch
//! continues; diagnostics print to stderr alongside the output.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match flow2ts::cli::run(std::env::args()) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}
