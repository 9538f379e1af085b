//! Voltage-axis conventions and single-panel drawing
//!
//! The y-axis is a presentation convention, not derived from the data: every
//! panel spans -90..90 mV with reference lines at rest (-65 mV), spiking
//! threshold (-55 mV) and the 0 mV peak reference.

use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::glyph;
use crate::error::VizError;

/// Resting membrane potential (mV)
pub const RESTING_POTENTIAL_MV: f64 = -65.0;
/// Spiking threshold (mV)
pub const SPIKE_THRESHOLD_MV: f64 = -55.0;
/// Peak reference line (mV)
pub const PEAK_REFERENCE_MV: f64 = 0.0;
/// Lower display limit (mV)
pub const DISPLAY_FLOOR_MV: f64 = -90.0;
/// Upper display limit (mV)
pub const DISPLAY_CEILING_MV: f64 = 90.0;

/// Fixed voltage ticks, bottom to top
pub const VOLTAGE_TICKS: [f64; 3] = [RESTING_POTENTIAL_MV, SPIKE_THRESHOLD_MV, PEAK_REFERENCE_MV];

pub(crate) const BACKGROUND: RGBColor = RGBColor(255, 255, 255);
pub(crate) const INK: RGBColor = RGBColor(0, 0, 0);
pub(crate) const GRID: RGBColor = RGBColor(210, 210, 210);
pub(crate) const FRAME: RGBColor = RGBColor(60, 60, 60);
pub(crate) const LEGEND_BORDER: RGBColor = RGBColor(170, 170, 170);
pub(crate) const LEGEND_SHADOW: RGBColor = RGBColor(200, 200, 200);

const TICK_LENGTH: i32 = 3;
const LEGEND_PADDING: i32 = 3;
const SWATCH_LENGTH: i32 = 12;
pub(crate) const PLOT_MARGIN_RIGHT: u32 = 4;

/// Smallest plot height, in pixels, a voltage panel is drawn at
pub const MIN_PANEL_HEIGHT: u32 = 16;
/// Smallest plot width, in pixels, a voltage panel is drawn at
pub const MIN_PLOT_WIDTH: u32 = 32;

/// Tick positions with the precision needed to print them
#[derive(Debug, Clone, PartialEq)]
pub struct TickSet {
    values: Vec<f64>,
    decimals: usize,
}

impl TickSet {
    /// Ticks at explicit positions printed with `decimals` fraction digits
    pub fn new(values: Vec<f64>, decimals: usize) -> Self {
        Self { values, decimals }
    }

    /// Round-number ticks (1, 2 or 5 times a power of ten) covering `lo..=hi`
    pub fn nice(lo: f64, hi: f64, max_ticks: usize) -> Self {
        if !(hi > lo) || max_ticks == 0 || !lo.is_finite() || !hi.is_finite() {
            return Self::new(vec![lo], 0);
        }

        let raw = (hi - lo) / max_ticks as f64;
        let magnitude = 10f64.powf(raw.log10().floor());
        let step = [1.0, 2.0, 5.0, 10.0]
            .iter()
            .map(|m| m * magnitude)
            .find(|&s| s >= raw)
            .unwrap_or(10.0 * magnitude);

        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        let values = (first..=last).map(|k| k as f64 * step).collect();
        let decimals = (-step.log10().floor()).max(0.0) as usize;

        Self { values, decimals }
    }

    /// Multiples of `every` in `0..end` (end exclusive)
    pub fn multiples(every: usize, end: usize) -> Self {
        let values = (0..end).step_by(every.max(1)).map(|v| v as f64).collect();
        Self::new(values, 0)
    }

    /// Tick positions
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Printed form of a tick value
    pub fn format(&self, value: f64) -> String {
        format!("{:.*}", self.decimals, value)
    }

    /// Largest tick, if any
    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

/// What a single voltage panel shows
#[derive(Debug, Clone)]
pub struct PanelSpec<'a> {
    /// Time range of the x-axis
    pub x_range: Range<f64>,
    /// Vertical gridline positions
    pub x_ticks: &'a TickSet,
    /// Trace color
    pub color: RGBColor,
    /// Legend text, drawn upper right
    pub legend: Option<&'a str>,
    /// Glyph scale for tick labels and legend
    pub text_scale: u32,
    /// Pixels reserved left of the plot for voltage tick labels
    pub label_margin: u32,
}

/// Pixel placement of a drawn panel, in backend coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PanelGeometry {
    /// Horizontal pixel span of the plotting region
    pub plot_x: Range<i32>,
    /// Vertical pixel span of the plotting region
    pub plot_y: Range<i32>,
    /// Time range mapped onto `plot_x`
    pub x_range: Range<f64>,
}

impl PanelGeometry {
    /// Backend x pixel of time `t`
    pub fn x_pixel(&self, t: f64) -> i32 {
        let span = self.x_range.end - self.x_range.start;
        if span <= 0.0 {
            return self.plot_x.start;
        }
        let width = (self.plot_x.end - self.plot_x.start) as f64;
        self.plot_x.start + ((t - self.x_range.start) / span * width).round() as i32
    }
}

/// Convert backend coordinates to pixel coordinates local to `area`
pub(crate) fn to_local<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (x, y): (i32, i32),
) -> (i32, i32) {
    let (bx, by) = area.get_base_pixel();
    (x - bx, y - by)
}

/// Check that an image of `size` can hold a layout needing at least `min`
///
/// # Errors
/// * `InvalidParameter` - if either dimension falls short
pub(crate) fn ensure_fits(what: &str, size: (u32, u32), min: (u32, u32)) -> crate::error::Result<()> {
    if size.0 < min.0 || size.1 < min.1 {
        return Err(VizError::parameter(format!(
            "{} of {}x{} is too small, needs at least {}x{}",
            what, size.0, size.1, min.0, min.1
        )));
    }
    Ok(())
}

/// Draw one voltage panel: frame, gridlines, voltage ticks, trace and legend
///
/// `time` and `voltages` are drawn pairwise; only the shorter length is used.
/// Samples outside the display limits are clamped to them and non-finite
/// samples are skipped.
pub fn draw_voltage_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    spec: &PanelSpec<'_>,
    time: &[f64],
    voltages: &[f64],
) -> Result<PanelGeometry, DrawingAreaErrorKind<DB::ErrorType>> {
    let x0 = spec.x_range.start;
    let x1 = spec.x_range.end;

    let mut chart = ChartBuilder::on(area)
        .margin_left(spec.label_margin)
        .margin_right(PLOT_MARGIN_RIGHT)
        .build_cartesian_2d(x0..x1, DISPLAY_FLOOR_MV..DISPLAY_CEILING_MV)?;

    // Gridlines
    chart.draw_series(VOLTAGE_TICKS.iter().map(|&v| {
        PathElement::new(vec![(x0, v), (x1, v)], GRID.stroke_width(1))
    }))?;
    chart.draw_series(
        spec.x_ticks
            .values()
            .iter()
            .filter(|&&t| t >= x0 && t <= x1)
            .map(|&t| {
                PathElement::new(
                    vec![(t, DISPLAY_FLOOR_MV), (t, DISPLAY_CEILING_MV)],
                    GRID.stroke_width(1),
                )
            }),
    )?;

    // Trace
    let points: Vec<(f64, f64)> = time
        .iter()
        .zip(voltages.iter())
        .filter(|(t, v)| t.is_finite() && v.is_finite())
        .map(|(&t, &v)| (t, v.clamp(DISPLAY_FLOOR_MV, DISPLAY_CEILING_MV)))
        .collect();
    if points.len() >= 2 {
        chart.draw_series(LineSeries::new(points, spec.color.stroke_width(1)))?;
    }

    let (plot_x, plot_y) = chart.plotting_area().get_pixel_range();
    let geometry = PanelGeometry {
        plot_x: plot_x.clone(),
        plot_y: plot_y.clone(),
        x_range: spec.x_range.clone(),
    };

    // Frame
    let (left, top) = to_local(area, (plot_x.start, plot_y.start));
    let (right, bottom) = to_local(area, (plot_x.end - 1, plot_y.end - 1));
    area.draw(&Rectangle::new([(left, top), (right, bottom)], FRAME.stroke_width(1)))?;

    // Voltage ticks
    let text_h = glyph::text_height(spec.text_scale);
    for &v in VOLTAGE_TICKS.iter() {
        let (_, y) = to_local(area, chart.backend_coord(&(x0, v)));
        area.draw(&PathElement::new(
            vec![(left - TICK_LENGTH, y), (left, y)],
            FRAME.stroke_width(1),
        ))?;
        glyph::draw_text_right(
            area,
            (left - TICK_LENGTH - 2, y - text_h / 2),
            &format!("{}", v),
            spec.text_scale,
            &INK,
        )?;
    }

    if let Some(label) = spec.legend {
        draw_legend(area, (right, top), label, spec)?;
    }

    Ok(geometry)
}

/// Legend box anchored to the upper-right corner of the plot
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (right, top): (i32, i32),
    label: &str,
    spec: &PanelSpec<'_>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let scale = spec.text_scale;
    let text_w = glyph::text_width(label, scale);
    let text_h = glyph::text_height(scale);
    let swatch = SWATCH_LENGTH * scale as i32;

    let box_w = LEGEND_PADDING * 3 + swatch + text_w;
    let box_h = LEGEND_PADDING * 2 + text_h;
    let x0 = right - LEGEND_PADDING - box_w;
    let y0 = top + LEGEND_PADDING;

    area.draw(&Rectangle::new(
        [(x0 + 2, y0 + 2), (x0 + box_w + 2, y0 + box_h + 2)],
        LEGEND_SHADOW.filled(),
    ))?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        BACKGROUND.filled(),
    ))?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        LEGEND_BORDER.stroke_width(1),
    ))?;

    let mid_y = y0 + box_h / 2;
    area.draw(&PathElement::new(
        vec![
            (x0 + LEGEND_PADDING, mid_y),
            (x0 + LEGEND_PADDING + swatch, mid_y),
        ],
        spec.color.stroke_width(2),
    ))?;
    glyph::draw_text(
        area,
        (x0 + LEGEND_PADDING * 2 + swatch, y0 + LEGEND_PADDING),
        label,
        scale,
        &INK,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_voltage_conventions() {
        assert_eq!(VOLTAGE_TICKS, [-65.0, -55.0, 0.0]);
        assert!(VOLTAGE_TICKS
            .iter()
            .all(|&v| v > DISPLAY_FLOOR_MV && v < DISPLAY_CEILING_MV));
    }

    #[test]
    fn test_nice_ticks() {
        let ticks = TickSet::nice(0.0, 100.0, 10);
        assert_eq!(ticks.values().len(), 11);
        assert_relative_eq!(ticks.values()[3], 30.0);
        assert_eq!(ticks.format(30.0), "30");

        let ticks = TickSet::nice(0.0, 1.0, 4);
        assert_relative_eq!(ticks.values()[1], 0.5);
        assert_eq!(ticks.format(0.5), "0.5");
    }

    #[test]
    fn test_nice_ticks_degenerate_range() {
        let ticks = TickSet::nice(3.0, 3.0, 10);
        assert_eq!(ticks.values(), &[3.0]);
    }

    #[test]
    fn test_multiples() {
        let ticks = TickSet::multiples(5, 100);
        assert_eq!(ticks.values().len(), 20);
        assert_eq!(ticks.max(), Some(95.0));
        assert_eq!(TickSet::multiples(5, 0).values().len(), 0);
    }

    #[test]
    fn test_x_pixel_mapping() {
        let geometry = PanelGeometry {
            plot_x: 100..300,
            plot_y: 0..50,
            x_range: 0.0..100.0,
        };
        assert_eq!(geometry.x_pixel(0.0), 100);
        assert_eq!(geometry.x_pixel(50.0), 200);
        assert_eq!(geometry.x_pixel(100.0), 300);
    }

    #[test]
    fn test_draw_panel_reports_geometry() {
        let mut buffer = vec![0u8; 200 * 80 * 3];
        let ticks = TickSet::nice(0.0, 1.0, 4);
        let spec = PanelSpec {
            x_range: 0.0..1.0,
            x_ticks: &ticks,
            color: RGBColor(255, 0, 0),
            legend: Some("L3 N0"),
            text_scale: 1,
            label_margin: 24,
        };
        let time = [0.0, 0.5, 1.0];
        let voltages = [-65.0, 40.0, 500.0];

        let geometry = {
            let backend = BitMapBackend::with_buffer(&mut buffer, (200, 80));
            let area = backend.into_drawing_area();
            area.fill(&BACKGROUND).unwrap();
            let geometry = draw_voltage_panel(&area, &spec, &time, &voltages).unwrap();
            area.present().unwrap();
            geometry
        };

        assert!(geometry.plot_x.start >= 24);
        assert!(geometry.plot_x.end <= 200);
        assert!(geometry.plot_y.end <= 80);
    }
}
