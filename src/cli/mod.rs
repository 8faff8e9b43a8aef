//! CLI Module
//!
//! Command-line interface for rendering and checking soundtracks.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::layers::LayerKind;

/// Dirge - layered procedural soundtrack with an objective quality gate
#[derive(Parser, Debug)]
#[command(name = "dirge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate all four layers and mix them into one WAV
    Render {
        /// Output WAV file
        #[arg(short, long, default_value = "soundtrack.wav")]
        output: PathBuf,

        /// Also write each layer as <dir>/<layer>_layer.wav
        #[arg(long)]
        layers_dir: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the noise seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the duration in seconds
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Generate a single layer
    Layer {
        /// Layer to generate
        #[arg(value_parser = parse_layer)]
        kind: LayerKind,

        /// Output WAV file (defaults to <layer>_layer.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run the quality gate over a WAV file
    Check {
        /// WAV file to analyze
        file: PathBuf,

        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// JSON configuration file (only the gate section is used)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print or write the default configuration
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_layer(s: &str) -> std::result::Result<LayerKind, String> {
    s.parse().map_err(|e: crate::error::DirgeError| e.to_string())
}
