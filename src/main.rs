//! Dirge CLI - Procedural Soundtrack Renderer
//!
//! Command-line interface for rendering layered soundtracks and running the
//! quality gate over the result.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info};

use dirge::cli::commands;
use dirge::cli::{Cli, Commands};
use dirge::DirgeError;

/// Exit code for errors, distinct from a failed quality gate (1)
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    debug!("Dirge v{}", env!("CARGO_PKG_VERSION"));

    match handle_command(cli.command) {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            if let Some(cause) = err.downcast_ref::<DirgeError>() {
                eprintln!("[{}] {}", cause.error_code(), cause.recovery_hint());
            }
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<ExitCode> {
    match cmd {
        Commands::Render {
            output,
            layers_dir,
            config,
            seed,
            duration,
        } => {
            commands::render(&output, layers_dir.as_deref(), config.as_deref(), seed, duration)
                .with_context(|| format!("failed to render {}", output.display()))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Layer {
            kind,
            output,
            config,
        } => {
            commands::layer(kind, output.as_deref(), config.as_deref())
                .with_context(|| format!("failed to generate the {} layer", kind))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { file, json, config } => {
            let passed = commands::check(&file, json.as_deref(), config.as_deref())
                .with_context(|| format!("could not analyze {}", file.display()))?;
            if passed {
                info!("Quality gate passed");
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Config { output } => {
            commands::print_config(output.as_deref()).context("failed to write config")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
