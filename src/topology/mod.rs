//! Network Topology Module
//!
//! Derives every neuron's layer, position, color and connectivity label from
//! nothing but the ordered layer sizes:
//! - Layer sizes: validation and cumulative-offset lookup
//! - Palette: named colors and the per-layer palette table
//! - Labeler: per-neuron descriptors

mod labeler;
mod layers;
mod palette;

pub use labeler::{NeuronDescriptor, TopologyLabeler};
pub use layers::{LayerSizes, NeuronAddress, REFERENCE_LAYER_SIZES};
pub use palette::{LayerPalette, TraceColor};
