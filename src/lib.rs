//! Spikeviz - Voltage History Visualization for Layered Spiking Networks
//!
//! An external dynamics engine integrates a layered network and hands back
//! one flat buffer of membrane voltages. Spikeviz turns that buffer into
//! pictures:
//! 1. Layout resolution - the flat buffer becomes one series per neuron
//! 2. Topology labeling - every neuron gets a color and a connectivity label
//! 3. Rendering - a frame-stepped animation of every panel, or a static plot
//!    of a single neuron
//!
//! # Architecture
//!
//! - `engine`: engine boundary, scoped sessions, buffer layout, recordings
//! - `topology`: layer sizes, palettes and neuron descriptors
//! - `render`: panels, grid, animation driver, artifact manifests
//! - `pipeline`: one full pass from engine to artifact

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod topology;

pub use config::{RenderConfig, TailPolicy};
pub use error::{Result, VizError};
pub use pipeline::{render_animation, render_trace, RenderOutcome};
