//! doclinks - A link checker for Markdown documentation trees
//!
//! doclinks provides:
//! - Link extraction from Markdown documents
//! - Section anchor resolution with numbered-section and suffix fuzzing
//! - Sequential or parallel scanning with deterministic aggregation
//! - Batch link rewriting and TODO annotation of dead links
//! - Text or JSON reports

use clap::Parser;
use std::process::ExitCode;

mod anchors;
mod backends;
mod cli;
mod core;
mod flows;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
