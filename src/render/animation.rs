//! Animation Driver
//!
//! Walks a [`FrameCursor`] over a [`TraceGrid`], handing every frame to a
//! [`FrameSink`] in strictly increasing order. Frame `f + 1` is only produced
//! after the sink has committed frame `f`.
//!
//! The GIF sink renders into a temporary file next to the target and renames
//! it into place only after the last frame has been committed, so a failed
//! pass never leaves a partial artifact behind.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;

use super::cursor::{DriverState, FrameCursor, FrameSchedule, FrameWindow};
use super::grid::TraceGrid;
use crate::error::{Result, VizError};

/// Frames between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Consumer of rendered frames
pub trait FrameSink {
    /// Render and commit one frame
    ///
    /// Called once per frame, in frame order.
    fn commit(&mut self, grid: &TraceGrid<'_>, window: FrameWindow) -> Result<()>;
}

/// Drives one animation pass
///
/// `drive` consumes the driver: a pass cannot be restarted or rewound.
#[derive(Debug)]
pub struct AnimationDriver<'g, 'a> {
    grid: &'g TraceGrid<'a>,
    cursor: FrameCursor,
}

impl<'g, 'a> AnimationDriver<'g, 'a> {
    /// Prepare a pass of `schedule` over `grid`
    ///
    /// # Errors
    /// * `InvalidParameter` - if the schedule and the grid disagree on T
    pub fn new(grid: &'g TraceGrid<'a>, schedule: FrameSchedule) -> Result<Self> {
        if schedule.num_steps() != grid.num_steps() {
            return Err(VizError::parameter(format!(
                "schedule covers {} steps, series have {}",
                schedule.num_steps(),
                grid.num_steps()
            )));
        }
        Ok(Self {
            grid,
            cursor: FrameCursor::new(schedule),
        })
    }

    /// Frames this pass will produce
    pub fn frame_count(&self) -> usize {
        self.cursor.frame_count()
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.cursor.state()
    }

    /// Produce every frame into `sink`
    ///
    /// Returns the number of committed frames. Stops at the first sink error.
    pub fn drive<S: FrameSink + ?Sized>(mut self, sink: &mut S) -> Result<usize> {
        let total = self.cursor.frame_count();
        let start = Instant::now();
        debug!(
            "[ANIMATE] {} frames, stride {}",
            total,
            self.cursor.schedule().stride()
        );

        let mut committed = 0;
        while let Some(window) = self.cursor.advance() {
            sink.commit(self.grid, window)?;
            committed += 1;

            if committed % PROGRESS_INTERVAL == 0 || committed == total {
                info!(
                    "[ANIMATE] Frame {}/{} ({} samples visible)",
                    committed, total, window.cursor
                );
            }
        }

        debug!(
            "[ANIMATE] Committed {} frames in {:.3}s",
            committed,
            start.elapsed().as_secs_f64()
        );
        Ok(committed)
    }
}

/// Sink drawing every frame onto one bitmap drawing area
pub struct BitmapSink<'b> {
    root: DrawingArea<BitMapBackend<'b>, Shift>,
    path: PathBuf,
}

impl<'b> BitmapSink<'b> {
    /// Wrap a drawing area; `path` is only used in error reports
    pub fn new(root: DrawingArea<BitMapBackend<'b>, Shift>, path: impl Into<PathBuf>) -> Self {
        Self {
            root,
            path: path.into(),
        }
    }
}

impl FrameSink for BitmapSink<'_> {
    fn commit(&mut self, grid: &TraceGrid<'_>, window: FrameWindow) -> Result<()> {
        grid.draw(&self.root, window.cursor)
            .map_err(|e| VizError::write_failure(&self.path, e))?;
        self.root
            .present()
            .map_err(|e| VizError::write_failure(&self.path, e))
    }
}

/// Output options of an animated GIF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifOptions {
    /// Image size in pixels
    pub size: (u32, u32),
    /// Delay between frames (ms)
    pub frame_delay_ms: u32,
}

/// Render `grid` as an animated GIF at `path`
///
/// Returns the number of frames written. A schedule with zero frames writes
/// nothing and returns 0.
///
/// # Errors
/// * `InvalidParameter` - if `options.size` cannot hold every panel
/// * `AnimationWriteFailure` - if the GIF cannot be produced or moved into place
pub fn write_animation(
    grid: &TraceGrid<'_>,
    schedule: FrameSchedule,
    options: GifOptions,
    path: &Path,
) -> Result<usize> {
    let driver = AnimationDriver::new(grid, schedule)?;
    grid.check_size(options.size)?;
    if driver.frame_count() == 0 {
        warn!(
            "[ANIMATE] {} steps fit no full stride of {}; skipping {}",
            schedule.num_steps(),
            schedule.stride(),
            path.display()
        );
        return Ok(0);
    }

    let staging = staging_file(path, ".gif")?;
    let frames = {
        let backend = BitMapBackend::gif(staging.path(), options.size, options.frame_delay_ms)
            .map_err(|e| VizError::write_failure(path, e))?;
        let mut sink = BitmapSink::new(backend.into_drawing_area(), path);
        driver.drive(&mut sink)?
    };

    staging
        .persist(path)
        .map_err(|e| VizError::write_failure(path, e))?;

    info!("[ANIMATE] Wrote {} ({} frames)", path.display(), frames);
    Ok(frames)
}

/// Temporary file in the directory of `path`, removed unless persisted
pub(crate) fn staging_file(path: &Path, suffix: &str) -> Result<tempfile::NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    tempfile::Builder::new()
        .prefix(".spikeviz-")
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| VizError::write_failure(path, e))
}
