//! Layer sizes of a feed-forward network
//!
//! Neurons are numbered layer-major: all of layer 1, then all of layer 2, and
//! so on. A global index is mapped back to its layer by cumulative-sum lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VizError};

/// Layer sizes of the reference network
pub const REFERENCE_LAYER_SIZES: [i32; 3] = [16, 4, 1];

/// Position of a neuron inside the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeuronAddress {
    /// Zero-based layer index
    pub layer: usize,
    /// Zero-based index within the layer
    pub index: usize,
}

impl fmt::Display for NeuronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} N{}", self.layer + 1, self.index)
    }
}

/// Validated, ordered sequence of layer sizes
///
/// Every layer holds at least one neuron and there is at least one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct LayerSizes {
    sizes: Vec<usize>,
    /// offsets[l] = number of neurons in layers before l
    offsets: Vec<usize>,
}

impl LayerSizes {
    /// Validate a layer-size sequence as handed to the engine
    ///
    /// # Errors
    /// * `InvalidTopology` - if the sequence is empty or any size is <= 0
    pub fn new(sizes: &[i32]) -> Result<Self> {
        if sizes.is_empty() {
            return Err(VizError::topology("layer-size sequence is empty"));
        }

        if let Some(layer) = sizes.iter().position(|&s| s <= 0) {
            return Err(VizError::topology(format!(
                "layer {} has size {} (every layer needs at least one neuron)",
                layer + 1,
                sizes[layer]
            )));
        }

        let sizes: Vec<usize> = sizes.iter().map(|&s| s as usize).collect();
        let offsets = sizes
            .iter()
            .scan(0usize, |acc, &s| {
                let start = *acc;
                *acc += s;
                Some(start)
            })
            .collect();

        Ok(Self { sizes, offsets })
    }

    /// The reference `[16, 4, 1]` topology
    pub fn reference() -> Self {
        Self {
            sizes: vec![16, 4, 1],
            offsets: vec![0, 16, 20],
        }
    }

    /// Number of layers
    pub fn num_layers(&self) -> usize {
        self.sizes.len()
    }

    /// Total neuron count N
    pub fn num_neurons(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0) + self.sizes.last().copied().unwrap_or(0)
    }

    /// Size of a layer, if it exists
    pub fn size(&self, layer: usize) -> Option<usize> {
        self.sizes.get(layer).copied()
    }

    /// Global index of the first neuron of a layer
    pub fn offset(&self, layer: usize) -> Option<usize> {
        self.offsets.get(layer).copied()
    }

    /// All layer sizes
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Whether `layer` is the last (output) layer
    pub fn is_terminal(&self, layer: usize) -> bool {
        layer + 1 == self.sizes.len()
    }

    /// Map a global index to its layer address
    ///
    /// Returns `None` if `global_index >= N`.
    pub fn locate(&self, global_index: usize) -> Option<NeuronAddress> {
        if global_index >= self.num_neurons() {
            return None;
        }
        // Last layer whose offset is <= global_index
        let layer = self.offsets.partition_point(|&start| start <= global_index) - 1;
        Some(NeuronAddress {
            layer,
            index: global_index - self.offsets[layer],
        })
    }

    /// Map a layer address back to its global index
    pub fn global_index(&self, address: NeuronAddress) -> Option<usize> {
        let size = self.size(address.layer)?;
        (address.index < size).then(|| self.offsets[address.layer] + address.index)
    }

    /// Postsynaptic target of a neuron
    ///
    /// Neuron `k` of a non-terminal layer `l` feeds neuron `k mod s(l+1)` of
    /// layer `l + 1`. The terminal layer has no target.
    pub fn target_of(&self, address: NeuronAddress) -> Option<NeuronAddress> {
        let next_size = self.size(address.layer + 1)?;
        Some(NeuronAddress {
            layer: address.layer + 1,
            index: address.index % next_size,
        })
    }

    /// Layer sizes in the engine's integer representation
    pub fn to_i32(&self) -> Vec<i32> {
        self.sizes.iter().map(|&s| s as i32).collect()
    }
}

impl TryFrom<Vec<i32>> for LayerSizes {
    type Error = VizError;

    fn try_from(sizes: Vec<i32>) -> Result<Self> {
        LayerSizes::new(&sizes)
    }
}

impl From<LayerSizes> for Vec<i32> {
    fn from(sizes: LayerSizes) -> Self {
        sizes.to_i32()
    }
}

impl fmt::Display for LayerSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.sizes.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_reference_topology() {
        let sizes = LayerSizes::new(&REFERENCE_LAYER_SIZES).unwrap();
        assert_eq!(sizes, LayerSizes::reference());
        assert_eq!(sizes.num_layers(), 3);
        assert_eq!(sizes.num_neurons(), 21);
        assert_eq!(sizes.offset(1), Some(16));
        assert_eq!(sizes.offset(2), Some(20));
    }

    #[test_case(&[16, 0, 1] ; "zero sized layer")]
    #[test_case(&[] ; "empty sequence")]
    #[test_case(&[4, -2] ; "negative layer")]
    fn test_invalid_topology(sizes: &[i32]) {
        match LayerSizes::new(sizes) {
            Err(VizError::InvalidTopology { .. }) => {}
            other => panic!("Expected InvalidTopology, got: {:?}", other),
        }
    }

    #[test_case(0, 0, 0)]
    #[test_case(15, 0, 15)]
    #[test_case(16, 1, 0)]
    #[test_case(19, 1, 3)]
    #[test_case(20, 2, 0)]
    fn test_locate(global: usize, layer: usize, index: usize) {
        let sizes = LayerSizes::reference();
        assert_eq!(sizes.locate(global), Some(NeuronAddress { layer, index }));
        assert_eq!(sizes.global_index(NeuronAddress { layer, index }), Some(global));
    }

    #[test]
    fn test_locate_out_of_range() {
        let sizes = LayerSizes::reference();
        assert_eq!(sizes.locate(21), None);
        assert_eq!(sizes.global_index(NeuronAddress { layer: 1, index: 4 }), None);
    }

    #[test]
    fn test_target_of() {
        let sizes = LayerSizes::reference();
        let target = sizes.target_of(NeuronAddress { layer: 0, index: 13 });
        assert_eq!(target, Some(NeuronAddress { layer: 1, index: 1 }));

        let target = sizes.target_of(NeuronAddress { layer: 1, index: 3 });
        assert_eq!(target, Some(NeuronAddress { layer: 2, index: 0 }));

        assert_eq!(sizes.target_of(NeuronAddress { layer: 2, index: 0 }), None);
    }

    #[test]
    fn test_serde_validates() {
        let sizes: LayerSizes = serde_json::from_str("[16,4,1]").unwrap();
        assert_eq!(sizes.num_neurons(), 21);
        assert_eq!(serde_json::to_string(&sizes).unwrap(), "[16,4,1]");

        assert!(serde_json::from_str::<LayerSizes>("[16,0,1]").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(LayerSizes::reference().to_string(), "[16, 4, 1]");
        assert_eq!(NeuronAddress { layer: 1, index: 2 }.to_string(), "L2 N2");
    }
}
