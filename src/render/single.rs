//! Static plot of one neuron's full trace

use std::path::Path;

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::animation::staging_file;
use super::axes::{
    self, PanelGeometry, PanelSpec, TickSet, BACKGROUND, INK, MIN_PANEL_HEIGHT, MIN_PLOT_WIDTH,
    PLOT_MARGIN_RIGHT,
};
use super::glyph;
use super::grid::{figure_title, TIME_CAPTION, VOLTAGE_CAPTION};
use crate::engine::TimeAxis;
use crate::error::{Result, VizError};
use crate::topology::NeuronDescriptor;

/// Time ticks are placed on multiples of this value
pub const TIME_TICK_EVERY: usize = 5;

const TITLE_SCALE: u32 = 2;
const TEXT_SCALE: u32 = 2;
const PADDING: i32 = 10;

fn title_height() -> i32 {
    glyph::text_height(TITLE_SCALE) + PADDING * 2
}

fn footer_height() -> i32 {
    glyph::text_height(TEXT_SCALE) * 2 + PADDING * 3
}

fn caption_width() -> i32 {
    glyph::text_width("M", TEXT_SCALE) + PADDING * 2
}

fn label_margin() -> i32 {
    glyph::text_width("-65", TEXT_SCALE) + PADDING
}

/// Renders one neuron's complete series as a static image
#[derive(Debug, Clone)]
pub struct SingleTraceRenderer<'a> {
    descriptor: &'a NeuronDescriptor,
    trace: &'a [f64],
    time: &'a TimeAxis,
    title: String,
    ticks: TickSet,
}

impl<'a> SingleTraceRenderer<'a> {
    /// Prepare a plot of `trace`
    ///
    /// Time ticks sit at multiples of 5 within `[0, T / stride)`.
    ///
    /// # Errors
    /// * `InvalidParameter` - if `trace` and `time` differ in length or
    ///   `stride` is zero
    pub fn new(
        descriptor: &'a NeuronDescriptor,
        trace: &'a [f64],
        time: &'a TimeAxis,
        input_current: f64,
        stride: usize,
    ) -> Result<Self> {
        if stride == 0 {
            return Err(VizError::parameter("stride must be at least 1"));
        }
        if trace.len() != time.len() {
            return Err(VizError::parameter(format!(
                "trace has {} samples, time axis has {}",
                trace.len(),
                time.len()
            )));
        }

        Ok(Self {
            descriptor,
            trace,
            time,
            title: figure_title(input_current),
            ticks: TickSet::multiples(TIME_TICK_EVERY, time.len() / stride),
        })
    }

    /// Neuron being plotted
    pub fn descriptor(&self) -> &'a NeuronDescriptor {
        self.descriptor
    }

    /// Time tick positions
    pub fn ticks(&self) -> &TickSet {
        &self.ticks
    }

    /// Horizontal extent: the full duration, widened to the last tick
    pub fn x_range(&self) -> std::ops::Range<f64> {
        let end = self
            .ticks
            .max()
            .map_or(self.time.duration(), |t| t.max(self.time.duration()));
        0.0..end
    }

    /// Smallest image that fits the title, the footer and one plot
    pub fn min_size() -> (u32, u32) {
        let min_w = caption_width() + label_margin() + (PLOT_MARGIN_RIGHT + MIN_PLOT_WIDTH) as i32;
        let min_h = title_height() + footer_height() + MIN_PANEL_HEIGHT as i32;
        (min_w as u32, min_h as u32)
    }

    /// Draw the plot onto `root`
    ///
    /// Fails with `LayoutError` when the area is below
    /// [`SingleTraceRenderer::min_size`].
    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> std::result::Result<PanelGeometry, DrawingAreaErrorKind<DB::ErrorType>> {
        let (width, height) = root.dim_in_pixel();
        let (min_w, min_h) = Self::min_size();
        if width < min_w || height < min_h {
            return Err(DrawingAreaErrorKind::LayoutError);
        }
        root.fill(&BACKGROUND)?;

        let title_h = title_height();
        let footer_h = footer_height();
        let caption_w = caption_width();

        let (title_area, rest) = root.split_vertically(title_h);
        let (body, footer) = rest.split_vertically(height as i32 - title_h - footer_h);
        let (caption_area, plot_area) = body.split_horizontally(caption_w);

        glyph::draw_text_centered(
            &title_area,
            (width as i32 / 2, PADDING),
            &self.title,
            TITLE_SCALE,
            &INK,
        )?;
        let (_, body_h) = body.dim_in_pixel();
        glyph::draw_text_vertical(
            &caption_area,
            (PADDING, body_h as i32 / 2),
            VOLTAGE_CAPTION,
            TEXT_SCALE,
            &INK,
        )?;

        let spec = PanelSpec {
            x_range: self.x_range(),
            x_ticks: &self.ticks,
            color: self.descriptor.color.to_rgb_color(),
            legend: Some(self.descriptor.label.as_str()),
            text_scale: TEXT_SCALE,
            label_margin: label_margin() as u32,
        };
        let geometry = axes::draw_voltage_panel(&plot_area, &spec, self.time.values(), self.trace)?;

        for &t in self.ticks.values() {
            let (x, _) = axes::to_local(&footer, (geometry.x_pixel(t), 0));
            glyph::draw_text_centered(
                &footer,
                (x, PADDING),
                &self.ticks.format(t),
                TEXT_SCALE,
                &INK,
            )?;
        }
        let center = (geometry.plot_x.start + geometry.plot_x.end) / 2;
        let (x, _) = axes::to_local(&footer, (center, 0));
        glyph::draw_text_centered(
            &footer,
            (x, PADDING * 2 + glyph::text_height(TEXT_SCALE)),
            TIME_CAPTION,
            TEXT_SCALE,
            &INK,
        )?;

        Ok(geometry)
    }

    /// Render to a PNG file at `path`
    ///
    /// # Errors
    /// * `InvalidParameter` - if `size` is below [`SingleTraceRenderer::min_size`]
    /// * `AnimationWriteFailure` - if the image cannot be produced or moved into place
    pub fn render_png(&self, path: &Path, size: (u32, u32)) -> Result<()> {
        axes::ensure_fits("trace image", size, Self::min_size())?;
        let staging = staging_file(path, ".png")?;
        {
            let root = BitMapBackend::new(staging.path(), size).into_drawing_area();
            self.draw(&root)
                .map_err(|e| VizError::write_failure(path, e))?;
            root.present()
                .map_err(|e| VizError::write_failure(path, e))?;
        }
        staging
            .persist(path)
            .map_err(|e| VizError::write_failure(path, e))?;

        info!(
            "[TRACE] Wrote {} ({})",
            path.display(),
            self.descriptor.label
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{LayerSizes, TopologyLabeler};
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn output_neuron() -> NeuronDescriptor {
        let sizes = LayerSizes::reference();
        TopologyLabeler::new()
            .describe(&sizes, sizes.num_neurons() - 1)
            .unwrap()
    }

    #[test]
    fn test_ticks_follow_stride() {
        let descriptor = output_neuron();
        let time = TimeAxis::new(10_000, 0.01).unwrap();
        let trace = vec![-65.0; 10_000];
        let renderer = SingleTraceRenderer::new(&descriptor, &trace, &time, 0.451, 100).unwrap();

        assert_eq!(renderer.ticks().values().len(), 20);
        assert_eq!(renderer.ticks().max(), Some(95.0));
        assert_relative_eq!(renderer.x_range().end, 100.0, epsilon = 1e-9);
        assert_eq!(renderer.descriptor().label, "L3 N0");
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let descriptor = output_neuron();
        let time = TimeAxis::new(100, 0.01).unwrap();
        let trace = vec![-65.0; 99];
        assert!(matches!(
            SingleTraceRenderer::new(&descriptor, &trace, &time, 0.451, 10),
            Err(VizError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_render_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.png");

        let descriptor = output_neuron();
        let time = TimeAxis::new(500, 0.01).unwrap();
        let trace: Vec<f64> = (0..500).map(|i| -65.0 + (i % 100) as f64).collect();
        let renderer = SingleTraceRenderer::new(&descriptor, &trace, &time, 0.451, 10).unwrap();

        renderer.render_png(&path, (400, 240)).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_render_png_rejects_undersized_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.png");

        let descriptor = output_neuron();
        let time = TimeAxis::new(100, 0.01).unwrap();
        let trace = vec![-65.0; 100];
        let renderer = SingleTraceRenderer::new(&descriptor, &trace, &time, 0.451, 10).unwrap();

        let (min_w, min_h) = SingleTraceRenderer::min_size();
        for size in [(8, 8), (400, min_h - 1), (min_w - 1, 240)] {
            assert!(matches!(
                renderer.render_png(&path, size),
                Err(VizError::InvalidParameter { .. })
            ));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
