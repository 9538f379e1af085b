//! Spikeviz CLI - Voltage History Visualization
//!
//! Command-line interface for rendering recorded spiking network runs.

use clap::Parser;
use env_logger::Env;
use log::info;

use spikeviz::cli::{commands, Cli, Commands};
use spikeviz::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Spikeviz v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Spikeviz v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Synth {
            output,
            layers,
            steps,
            dt,
            current,
        } => commands::synth(&output, &layers, steps, dt, current),
        Commands::Animate {
            recording,
            config,
            output,
            stride,
        } => commands::animate(
            &recording,
            config.as_deref(),
            output.as_deref(),
            stride,
        ),
        Commands::Trace {
            recording,
            neuron,
            config,
            output,
        } => commands::trace(&recording, neuron, config.as_deref(), output.as_deref()),
        Commands::Describe { recording } => commands::describe(&recording),
        Commands::InitConfig { path } => commands::init_config(&path),
    }
}
