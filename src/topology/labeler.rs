//! Topology-driven neuron labeling
//!
//! Every neuron gets a read-only [`NeuronDescriptor`] derived purely from the
//! layer sizes: where it sits, which color its trace uses and a connectivity
//! label such as `"L1 N5 -> L2 N1"`.

use serde::{Deserialize, Serialize};

use super::layers::{LayerSizes, NeuronAddress};
use super::palette::{LayerPalette, TraceColor};

/// Visual identity and position of one neuron
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronDescriptor {
    /// Layer-major index across the whole network
    pub global_index: usize,
    /// Index of the layer containing the neuron
    pub layer_index: usize,
    /// Position within the layer
    pub index_in_layer: usize,
    /// Trace color
    pub color: TraceColor,
    /// Connectivity label shown in the panel legend
    pub label: String,
    /// Postsynaptic neuron, `None` for the output layer
    pub target: Option<NeuronAddress>,
}

impl NeuronDescriptor {
    /// Layer address of this neuron
    pub fn address(&self) -> NeuronAddress {
        NeuronAddress {
            layer: self.layer_index,
            index: self.index_in_layer,
        }
    }
}

/// Computes descriptors for every neuron of a topology
#[derive(Debug, Clone, Default)]
pub struct TopologyLabeler {
    palette: LayerPalette,
}

impl TopologyLabeler {
    /// Labeler with the reference palette table
    pub fn new() -> Self {
        Self::default()
    }

    /// Labeler with a custom palette table
    pub fn with_palette(palette: LayerPalette) -> Self {
        Self { palette }
    }

    /// Palette table in use
    pub fn palette(&self) -> &LayerPalette {
        &self.palette
    }

    /// Descriptor of a single neuron, `None` if the index is out of range
    pub fn describe(&self, sizes: &LayerSizes, global_index: usize) -> Option<NeuronDescriptor> {
        let address = sizes.locate(global_index)?;
        let is_terminal = sizes.is_terminal(address.layer);
        let target = sizes.target_of(address);

        let label = match target {
            Some(target) => format!("{} -> {}", address, target),
            None => address.to_string(),
        };

        Some(NeuronDescriptor {
            global_index,
            layer_index: address.layer,
            index_in_layer: address.index,
            color: self.palette.color(address.layer, address.index, is_terminal),
            label,
            target,
        })
    }

    /// Descriptors for all neurons, in global-index order
    pub fn label(&self, sizes: &LayerSizes) -> Vec<NeuronDescriptor> {
        (0..sizes.num_neurons())
            .filter_map(|i| self.describe(sizes, i))
            .collect()
    }
}
