//! Display colors and the per-layer palette table

use std::fmt;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Named trace color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceColor {
    Red,
    Green,
    Blue,
    Pink,
    Orange,
    LightGreen,
    LightBlue,
    Purple,
    Black,
}

impl TraceColor {
    /// RGB components, matching the CSS named colors
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            TraceColor::Red => (255, 0, 0),
            TraceColor::Green => (0, 128, 0),
            TraceColor::Blue => (0, 0, 255),
            TraceColor::Pink => (255, 192, 203),
            TraceColor::Orange => (255, 165, 0),
            TraceColor::LightGreen => (144, 238, 144),
            TraceColor::LightBlue => (173, 216, 230),
            TraceColor::Purple => (128, 0, 128),
            TraceColor::Black => (0, 0, 0),
        }
    }

    /// Color as a plotters style color
    pub fn to_rgb_color(self) -> RGBColor {
        let (r, g, b) = self.rgb();
        RGBColor(r, g, b)
    }

    /// `#rrggbb` form of the color
    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Stable lowercase name
    pub fn name(self) -> &'static str {
        match self {
            TraceColor::Red => "red",
            TraceColor::Green => "green",
            TraceColor::Blue => "blue",
            TraceColor::Pink => "pink",
            TraceColor::Orange => "orange",
            TraceColor::LightGreen => "light-green",
            TraceColor::LightBlue => "light-blue",
            TraceColor::Purple => "purple",
            TraceColor::Black => "black",
        }
    }
}

impl fmt::Display for TraceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Palette table keyed by layer
///
/// Non-terminal layer `l` draws from `layers[l % layers.len()]`; the terminal
/// layer always draws from `terminal`. Within a palette the color of a
/// neuron is `palette[index_in_layer % palette.len()]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerPalette {
    layers: Vec<Vec<TraceColor>>,
    terminal: Vec<TraceColor>,
}

impl Default for LayerPalette {
    fn default() -> Self {
        Self {
            layers: vec![
                vec![
                    TraceColor::Red,
                    TraceColor::Green,
                    TraceColor::Blue,
                    TraceColor::Pink,
                ],
                vec![
                    TraceColor::Orange,
                    TraceColor::LightGreen,
                    TraceColor::LightBlue,
                    TraceColor::Purple,
                ],
            ],
            terminal: vec![TraceColor::Black],
        }
    }
}

impl LayerPalette {
    /// Build a palette table
    ///
    /// Returns `None` if there are no layer palettes or any palette is empty.
    pub fn new(layers: Vec<Vec<TraceColor>>, terminal: Vec<TraceColor>) -> Option<Self> {
        if layers.is_empty() || terminal.is_empty() || layers.iter().any(Vec::is_empty) {
            return None;
        }
        Some(Self { layers, terminal })
    }

    /// Palette used by a layer
    pub fn palette_for(&self, layer: usize, is_terminal: bool) -> &[TraceColor] {
        if is_terminal {
            &self.terminal
        } else {
            &self.layers[layer % self.layers.len()]
        }
    }

    /// Color of a neuron given its layer address
    pub fn color(&self, layer: usize, index_in_layer: usize, is_terminal: bool) -> TraceColor {
        let palette = self.palette_for(layer, is_terminal);
        palette[index_in_layer % palette.len()]
    }
}
