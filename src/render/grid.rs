//! Trace Grid
//!
//! One panel per neuron, stacked top to bottom in global-index order with no
//! vertical spacing. Panels share the time axis, labeled once under the
//! bottom panel, and follow the fixed voltage-axis conventions of
//! [`super::axes`].

use plotters::coord::Shift;
use plotters::prelude::*;

use super::axes::{
    self, PanelSpec, TickSet, BACKGROUND, INK, MIN_PANEL_HEIGHT, MIN_PLOT_WIDTH,
    PLOT_MARGIN_RIGHT,
};
use super::glyph;
use crate::engine::{ResolvedBuffer, TimeAxis};
use crate::error::{Result, VizError};
use crate::topology::NeuronDescriptor;

/// Caption of the shared time axis
pub const TIME_CAPTION: &str = "time in msec";
/// Caption of the voltage axes
pub const VOLTAGE_CAPTION: &str = "Voltage in mV";

const TITLE_SCALE: u32 = 3;
const CAPTION_SCALE: u32 = 2;
const STRIP_PADDING: i32 = 8;
const MAX_TIME_TICKS: usize = 10;

/// Pixel strips around the panel stack for a figure of a given width
#[derive(Debug, Clone, Copy)]
struct Strips {
    title_scale: u32,
    title_h: i32,
    footer_h: i32,
    caption_w: i32,
}

impl Strips {
    fn for_width(title: &str, width: u32) -> Self {
        let title_scale = ((width as i32 - STRIP_PADDING * 2) / glyph::text_width(title, 1))
            .clamp(1, TITLE_SCALE as i32) as u32;
        Self {
            title_scale,
            title_h: glyph::text_height(title_scale) + STRIP_PADDING * 2,
            footer_h: glyph::text_height(CAPTION_SCALE) * 2 + STRIP_PADDING * 3,
            caption_w: glyph::text_width("M", CAPTION_SCALE) + STRIP_PADDING * 2,
        }
    }
}

fn label_margin(text_scale: u32) -> i32 {
    glyph::text_width("-65", text_scale) + 8
}

/// Figure title for a run driven by `input_current` (uA)
pub fn figure_title(input_current: f64) -> String {
    format!("Voltage vs Time for I={:.6} uA", input_current)
}

/// A panel and the data it shows
#[derive(Debug, Clone, Copy)]
pub struct PanelHandle<'a> {
    /// Identity of the neuron drawn in this panel
    pub descriptor: &'a NeuronDescriptor,
    /// The neuron's full voltage series
    pub trace: &'a [f64],
}

impl<'a> PanelHandle<'a> {
    /// Visible part of the trace when `visible` samples are revealed
    pub fn visible(&self, visible: usize) -> &'a [f64] {
        &self.trace[..visible.min(self.trace.len())]
    }
}

/// Vertical stack of voltage panels sharing one time axis
#[derive(Debug, Clone)]
pub struct TraceGrid<'a> {
    descriptors: &'a [NeuronDescriptor],
    series: ResolvedBuffer<'a>,
    time: &'a TimeAxis,
    title: String,
    time_ticks: TickSet,
}

impl<'a> TraceGrid<'a> {
    /// Lay out one panel per descriptor
    ///
    /// # Errors
    /// * `InvalidParameter` - if the descriptors, the resolved series and the
    ///   time axis disagree on N or T
    pub fn new(
        descriptors: &'a [NeuronDescriptor],
        series: ResolvedBuffer<'a>,
        time: &'a TimeAxis,
        input_current: f64,
    ) -> Result<Self> {
        if descriptors.is_empty() {
            return Err(VizError::parameter("trace grid needs at least one panel"));
        }
        if descriptors.len() != series.num_neurons() {
            return Err(VizError::parameter(format!(
                "{} descriptors for {} resolved series",
                descriptors.len(),
                series.num_neurons()
            )));
        }
        if time.len() != series.num_steps() {
            return Err(VizError::parameter(format!(
                "time axis has {} samples, series have {}",
                time.len(),
                series.num_steps()
            )));
        }

        Ok(Self {
            descriptors,
            series,
            time,
            title: figure_title(input_current),
            time_ticks: TickSet::nice(0.0, time.duration(), MAX_TIME_TICKS),
        })
    }

    /// Number of panels
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Always false for a constructed grid
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Figure title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Shared time axis
    pub fn time(&self) -> &'a TimeAxis {
        self.time
    }

    /// Samples per series T
    pub fn num_steps(&self) -> usize {
        self.series.num_steps()
    }

    /// Panel `index`, `None` if out of range
    pub fn panel(&self, index: usize) -> Option<PanelHandle<'a>> {
        let descriptor = self.descriptors.get(index)?;
        let trace = self.series.trace(index)?;
        Some(PanelHandle { descriptor, trace })
    }

    /// Panels top to bottom
    pub fn panels(&self) -> impl Iterator<Item = PanelHandle<'a>> + '_ {
        self.descriptors
            .iter()
            .zip(self.series.traces())
            .map(|(descriptor, trace)| PanelHandle { descriptor, trace })
    }

    /// Smallest figure, at `width`, that fits the title, the footer and a
    /// [`MIN_PANEL_HEIGHT`] plot per panel
    ///
    /// The title shrinks with the width, so the height floor depends on it.
    pub fn min_size(&self, width: u32) -> (u32, u32) {
        let strips = Strips::for_width(&self.title, width);
        let min_w = strips.caption_w + label_margin(2)
            + (PLOT_MARGIN_RIGHT + MIN_PLOT_WIDTH) as i32;
        let min_h = strips.title_h + strips.footer_h + (MIN_PANEL_HEIGHT * self.len() as u32) as i32;
        (min_w as u32, min_h as u32)
    }

    /// Check that a figure of `size` can hold every panel
    ///
    /// # Errors
    /// * `InvalidParameter` - if `size` is below [`TraceGrid::min_size`]
    pub fn check_size(&self, size: (u32, u32)) -> Result<()> {
        axes::ensure_fits(
            &format!("figure for {} panels", self.len()),
            size,
            self.min_size(size.0),
        )
    }

    /// Draw the whole figure with the first `visible` samples of every
    /// series revealed
    ///
    /// Fails with `LayoutError` when the area is below
    /// [`TraceGrid::min_size`].
    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        visible: usize,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&BACKGROUND)?;

        let (width, height) = root.dim_in_pixel();
        let (min_w, min_h) = self.min_size(width);
        if width < min_w || height < min_h {
            return Err(DrawingAreaErrorKind::LayoutError);
        }
        let Strips {
            title_scale,
            title_h,
            footer_h,
            caption_w,
        } = Strips::for_width(&self.title, width);

        let (title_area, rest) = root.split_vertically(title_h);
        let (body, footer) = rest.split_vertically(height as i32 - title_h - footer_h);
        let (caption_area, panels_area) = body.split_horizontally(caption_w);

        glyph::draw_text_centered(
            &title_area,
            (width as i32 / 2, STRIP_PADDING),
            &self.title,
            title_scale,
            &INK,
        )?;

        let (_, body_h) = body.dim_in_pixel();
        glyph::draw_text_vertical(
            &caption_area,
            (STRIP_PADDING, body_h as i32 / 2),
            VOLTAGE_CAPTION,
            CAPTION_SCALE,
            &INK,
        )?;

        let (_, panels_h) = panels_area.dim_in_pixel();
        let panel_h = panels_h as usize / self.len();
        let text_scale = if panel_h >= 120 { 2 } else { 1 };
        let label_margin = label_margin(text_scale) as u32;

        let time = self.time.prefix(visible);
        let x_range = 0.0..self.time.duration();
        let areas = panels_area.split_evenly((self.len(), 1));

        let mut bottom = None;
        for (area, panel) in areas.iter().zip(self.panels()) {
            let spec = PanelSpec {
                x_range: x_range.clone(),
                x_ticks: &self.time_ticks,
                color: panel.descriptor.color.to_rgb_color(),
                legend: Some(panel.descriptor.label.as_str()),
                text_scale,
                label_margin,
            };
            bottom = Some(axes::draw_voltage_panel(
                area,
                &spec,
                time,
                panel.visible(visible),
            )?);
        }

        if let Some(geometry) = bottom {
            let tick_h = glyph::text_height(text_scale);
            for &t in self.time_ticks.values() {
                let (x, _) = axes::to_local(&footer, (geometry.x_pixel(t), 0));
                glyph::draw_text_centered(
                    &footer,
                    (x, STRIP_PADDING),
                    &self.time_ticks.format(t),
                    text_scale,
                    &INK,
                )?;
            }

            let center = (geometry.plot_x.start + geometry.plot_x.end) / 2;
            let (x, _) = axes::to_local(&footer, (center, 0));
            glyph::draw_text_centered(
                &footer,
                (x, STRIP_PADDING * 2 + tick_h),
                TIME_CAPTION,
                CAPTION_SCALE,
                &INK,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{LayerSizes, TopologyLabeler};

    fn fixture() -> (Vec<NeuronDescriptor>, Vec<f64>, TimeAxis) {
        let sizes = LayerSizes::new(&[2, 1]).unwrap();
        let descriptors = TopologyLabeler::new().label(&sizes);
        let samples = (0..30).map(|i| -65.0 + i as f64).collect();
        let time = TimeAxis::new(10, 0.01).unwrap();
        (descriptors, samples, time)
    }

    #[test]
    fn test_figure_title() {
        assert_eq!(figure_title(0.451), "Voltage vs Time for I=0.451000 uA");
    }

    #[test]
    fn test_panels_follow_global_order() {
        let (descriptors, samples, time) = fixture();
        let series = ResolvedBuffer::new(&samples, 3, 10).unwrap();
        let grid = TraceGrid::new(&descriptors, series, &time, 0.451).unwrap();

        assert_eq!(grid.len(), 3);
        let panels: Vec<_> = grid.panels().collect();
        assert_eq!(panels[2].descriptor.label, "L2 N0");
        assert_eq!(panels[1].trace[0], -55.0);
        assert_eq!(panels[0].visible(4).len(), 4);
        assert_eq!(panels[0].visible(40).len(), 10);
        assert!(grid.panel(3).is_none());
    }

    #[test]
    fn test_grid_rejects_mismatched_inputs() {
        let (descriptors, samples, time) = fixture();
        let series = ResolvedBuffer::new(&samples, 3, 10).unwrap();
        assert!(TraceGrid::new(&descriptors[..2], series, &time, 0.451).is_err());

        let short_time = TimeAxis::new(5, 0.01).unwrap();
        assert!(TraceGrid::new(&descriptors, series, &short_time, 0.451).is_err());
    }

    #[test]
    fn test_undersized_figure_rejected() {
        let (descriptors, samples, time) = fixture();
        let series = ResolvedBuffer::new(&samples, 3, 10).unwrap();
        let grid = TraceGrid::new(&descriptors, series, &time, 0.451).unwrap();

        let (min_w, min_h) = grid.min_size(480);
        assert!(min_w < 480);
        assert!(grid.check_size((480, min_h)).is_ok());
        assert!(matches!(
            grid.check_size((480, min_h - 1)),
            Err(VizError::InvalidParameter { .. })
        ));
        assert!(grid.check_size((8, 8)).is_err());

        let (w, h) = (480u32, 60u32);
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
        assert!(matches!(
            grid.draw(&root, 5),
            Err(DrawingAreaErrorKind::LayoutError)
        ));
    }

    #[test]
    fn test_draw_fills_background_and_inks_title() {
        let (descriptors, samples, time) = fixture();
        let series = ResolvedBuffer::new(&samples, 3, 10).unwrap();
        let grid = TraceGrid::new(&descriptors, series, &time, 0.451).unwrap();

        let (w, h) = (480u32, 360u32);
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            grid.draw(&root, 5).unwrap();
            root.present().unwrap();
        }

        // Top-left corner stays background, the title strip has ink
        assert_eq!(&buffer[0..3], &[255, 255, 255]);
        let title_rows = &buffer[..(w * 30 * 3) as usize];
        assert!(title_rows.chunks(3).any(|px| px == [0, 0, 0]));
    }
}
