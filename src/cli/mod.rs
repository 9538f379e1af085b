//! CLI Module
//!
//! Command-line interface operating on recorded engine runs.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spikeviz - voltage history visualization for layered spiking networks
#[derive(Parser, Debug)]
#[command(name = "spikeviz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a synthetic recording
    #[command(name = "synth")]
    Synth {
        /// Output recording (JSON)
        output: PathBuf,

        /// Layer sizes, comma separated
        #[arg(
            short,
            long,
            value_delimiter = ',',
            allow_negative_numbers = true,
            default_values_t = vec![16, 4, 1]
        )]
        layers: Vec<i32>,

        /// Number of integration steps
        #[arg(short, long, default_value_t = 10_000)]
        steps: usize,

        /// Integration step in ms
        #[arg(long, default_value_t = 0.01)]
        dt: f64,

        /// Clamp current in uA
        #[arg(short, long, default_value_t = 0.451)]
        current: f64,
    },

    /// Animate every neuron of a recording as a GIF
    #[command(name = "animate")]
    Animate {
        /// Recording to replay
        recording: PathBuf,

        /// Render configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output GIF path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Timesteps revealed per frame
        #[arg(long)]
        stride: Option<usize>,
    },

    /// Plot one neuron's full trace as a PNG
    #[command(name = "trace")]
    Trace {
        /// Recording to replay
        recording: PathBuf,

        /// Global neuron index (defaults to the output neuron)
        #[arg(short, long)]
        neuron: Option<usize>,

        /// Render configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the neuron descriptor table of a recording
    #[command(name = "describe")]
    Describe {
        /// Recording to inspect
        recording: PathBuf,
    },

    /// Write the default render configuration
    #[command(name = "init-config")]
    InitConfig {
        /// Output path
        path: PathBuf,
    },
}
