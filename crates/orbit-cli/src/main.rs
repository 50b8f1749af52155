// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orbit: local PDF transformations from the command line.
//
// Entry point. Initialises logging, loads the engine configuration, attaches
// whatever backends were compiled in, and runs one command.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use orbit_core::{EngineConfig, Result};
use orbit_document::Engine;

use commands::Command;

#[derive(Parser)]
#[command(name = "orbit", version)]
#[command(about = "Merge, split, overlay, rasterize, repair, diff and redact PDFs locally", long_about = None)]
struct Cli {
    /// Engine configuration as JSON; missing keys keep their defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, input_error = err.is_input_error(), "Command failed");
            eprintln!("orbit: {}", err);
            // 2 for bad input, 1 for backend or environment failures
            ExitCode::from(if err.is_input_error() { 2 } else { 1 })
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = build_engine(config);
    commands::execute(engine, cli.command)
}

/// Engine with the rasterizer attached when pdfium support is compiled in
/// and the library can be bound.
fn build_engine(config: EngineConfig) -> Engine {
    let engine = Engine::new(config);

    #[cfg(feature = "pdfium")]
    let engine = match orbit_document::PdfiumRasterizer::bind() {
        Ok(rasterizer) => engine.with_rasterizer(rasterizer),
        Err(err) => {
            tracing::warn!(error = %err, "Pdfium unavailable, rasterization commands will fail");
            engine
        }
    };

    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_config_flag_follows_the_subcommand() {
        let cli = Cli::try_parse_from([
            "orbit", "rotate", "in.pdf", "-o", "out.pdf", "--degrees", "-90", "--config", "orbit.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("orbit.json")));
        assert!(matches!(cli.command, Command::Rotate { degrees: -90, .. }));
    }

    #[test]
    fn raster_exports_accept_a_password() {
        let cli = Cli::try_parse_from([
            "orbit", "thumbnails", "in.pdf", "-o", "previews", "--password", "hunter2",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Thumbnails { password: Some(ref p), .. } if p == "hunter2"
        ));
        let cli = Cli::try_parse_from(["orbit", "images", "in.pdf", "-o", "out.zip"]).unwrap();
        assert!(matches!(cli.command, Command::Images { password: None, .. }));
    }
}
