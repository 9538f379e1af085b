//! Rendering Module
//!
//! Turns resolved voltage series into images:
//! - Axis conventions and single-panel drawing
//! - The per-neuron trace grid and its animation
//! - Static single-trace plots
//! - JSON manifests describing each artifact
//!
//! All text is drawn with the built-in pixel font in [`glyph`].

pub mod animation;
pub mod axes;
pub mod cursor;
pub mod glyph;
pub mod grid;
pub mod manifest;
pub mod single;

pub use animation::{write_animation, AnimationDriver, BitmapSink, FrameSink, GifOptions};
pub use axes::{
    PanelGeometry, PanelSpec, TickSet, DISPLAY_CEILING_MV, DISPLAY_FLOOR_MV, PEAK_REFERENCE_MV,
    RESTING_POTENTIAL_MV, SPIKE_THRESHOLD_MV, VOLTAGE_TICKS,
};
pub use cursor::{DriverState, FrameCursor, FrameSchedule, FrameWindow};
pub use grid::{figure_title, PanelHandle, TraceGrid};
pub use manifest::{ArtifactKind, ArtifactManifest, PanelRecord};
pub use single::SingleTraceRenderer;
