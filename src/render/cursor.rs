//! Frame Cursor for animation passes
//!
//! The schedule maps frame numbers to reveal positions; the cursor walks the
//! schedule exactly once. There is no seek and no reset: a cursor only moves
//! forward, and a finished cursor stays finished.

use std::fmt;

use log::debug;

use crate::config::TailPolicy;
use crate::error::{Result, VizError};

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// No frame produced yet
    #[default]
    Idle,
    /// At least one frame produced, more remain
    Running,
    /// Every frame produced
    Finished,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::Idle => write!(f, "Idle"),
            DriverState::Running => write!(f, "Running"),
            DriverState::Finished => write!(f, "Finished"),
        }
    }
}

/// Frame arithmetic for one animation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSchedule {
    num_steps: usize,
    stride: usize,
    tail: TailPolicy,
}

impl FrameSchedule {
    /// Schedule over `num_steps` samples revealing `stride` samples per frame
    ///
    /// # Errors
    /// * `InvalidParameter` - if `stride` or `num_steps` is zero
    pub fn new(num_steps: usize, stride: usize, tail: TailPolicy) -> Result<Self> {
        if stride == 0 {
            return Err(VizError::parameter("stride must be at least 1"));
        }
        if num_steps == 0 {
            return Err(VizError::parameter("number of steps must be at least 1"));
        }
        Ok(Self {
            num_steps,
            stride,
            tail,
        })
    }

    /// Samples per series T
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Samples revealed per frame
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Tail handling
    pub fn tail(&self) -> TailPolicy {
        self.tail
    }

    /// Number of frames in the pass
    ///
    /// `floor(T / stride)`, plus one when the tail is revealed and
    /// `T mod stride != 0`.
    pub fn frame_count(&self) -> usize {
        let full = self.num_steps / self.stride;
        match self.tail {
            TailPolicy::RevealTail if self.num_steps % self.stride != 0 => full + 1,
            _ => full,
        }
    }

    /// Number of samples visible in `frame`, clamped to T
    ///
    /// Frame `f` shows `f * stride` samples; the frame appended under
    /// [`TailPolicy::RevealTail`] shows all T.
    pub fn cursor(&self, frame: usize) -> usize {
        let full = self.num_steps / self.stride;
        if self.tail == TailPolicy::RevealTail && self.num_steps % self.stride != 0 && frame >= full
        {
            return self.num_steps;
        }
        frame.saturating_mul(self.stride).min(self.num_steps)
    }

    /// Samples that are never shown by this schedule
    pub fn hidden_tail(&self) -> usize {
        let last = self.frame_count().checked_sub(1).map_or(0, |f| self.cursor(f));
        self.num_steps - last
    }
}

/// One step of the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    /// Frame number, starting at 0
    pub index: usize,
    /// Visible prefix length of every series
    pub cursor: usize,
}

/// One-shot, forward-only walk over a [`FrameSchedule`]
#[derive(Debug, Clone)]
pub struct FrameCursor {
    schedule: FrameSchedule,
    next_frame: usize,
    state: DriverState,
}

impl FrameCursor {
    /// Create a cursor positioned before the first frame
    pub fn new(schedule: FrameSchedule) -> Self {
        Self {
            schedule,
            next_frame: 0,
            state: DriverState::Idle,
        }
    }

    /// Schedule being walked
    pub fn schedule(&self) -> &FrameSchedule {
        &self.schedule
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Next frame to be produced
    pub fn next_frame(&self) -> usize {
        self.next_frame
    }

    /// Total frames of the pass
    pub fn frame_count(&self) -> usize {
        self.schedule.frame_count()
    }

    /// Frames not yet produced
    pub fn remaining(&self) -> usize {
        self.frame_count() - self.next_frame
    }

    /// Check if every frame has been produced
    pub fn is_finished(&self) -> bool {
        self.state == DriverState::Finished
    }

    /// Produce the next frame window, `None` once the pass is over
    pub fn advance(&mut self) -> Option<FrameWindow> {
        if self.state == DriverState::Finished {
            return None;
        }
        if self.next_frame >= self.frame_count() {
            self.state = DriverState::Finished;
            debug!("[CURSOR] Finished after {} frames", self.next_frame);
            return None;
        }

        let window = FrameWindow {
            index: self.next_frame,
            cursor: self.schedule.cursor(self.next_frame),
        };
        self.next_frame += 1;
        self.state = if self.next_frame == self.frame_count() {
            DriverState::Finished
        } else {
            DriverState::Running
        };
        Some(window)
    }
}

impl Iterator for FrameCursor {
    type Item = FrameWindow;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameCursor {}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(10_000, 100, TailPolicy::Truncate, 100 ; "reference run")]
    #[test_case(10_050, 100, TailPolicy::Truncate, 100 ; "partial tail truncated")]
    #[test_case(10_050, 100, TailPolicy::RevealTail, 101 ; "partial tail revealed")]
    #[test_case(10_000, 100, TailPolicy::RevealTail, 100 ; "no tail to reveal")]
    #[test_case(99, 100, TailPolicy::Truncate, 0 ; "shorter than one stride")]
    #[test_case(99, 100, TailPolicy::RevealTail, 1 ; "short run revealed")]
    #[test_case(7, 1, TailPolicy::Truncate, 7 ; "unit stride")]
    fn test_frame_count(num_steps: usize, stride: usize, tail: TailPolicy, expected: usize) {
        let schedule = FrameSchedule::new(num_steps, stride, tail).unwrap();
        assert_eq!(schedule.frame_count(), expected);
    }

    #[test]
    fn test_frame_fifty_reveals_half() {
        let schedule = FrameSchedule::new(10_000, 100, TailPolicy::Truncate).unwrap();
        assert_eq!(schedule.cursor(0), 0);
        assert_eq!(schedule.cursor(50), 5_000);
        assert_eq!(schedule.cursor(99), 9_900);
        assert_eq!(schedule.hidden_tail(), 100);
    }

    #[test]
    fn test_reveal_tail_last_frame_shows_everything() {
        let schedule = FrameSchedule::new(10_050, 100, TailPolicy::RevealTail).unwrap();
        assert_eq!(schedule.cursor(99), 9_900);
        assert_eq!(schedule.cursor(schedule.frame_count() - 1), 10_050);
        assert_eq!(schedule.hidden_tail(), 0);
    }

    #[test]
    fn test_schedule_rejects_zero_stride() {
        assert!(matches!(
            FrameSchedule::new(100, 0, TailPolicy::Truncate),
            Err(VizError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_cursor_is_monotonic_and_complete() {
        let schedule = FrameSchedule::new(1_000, 100, TailPolicy::Truncate).unwrap();
        let mut cursor = FrameCursor::new(schedule);
        assert_eq!(cursor.state(), DriverState::Idle);
        assert_eq!(cursor.len(), 10);

        let windows: Vec<FrameWindow> = cursor.by_ref().collect();
        let indices: Vec<usize> = windows.iter().map(|w| w.index).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
        assert!(windows.windows(2).all(|pair| pair[0].cursor < pair[1].cursor));
        assert_eq!(cursor.state(), DriverState::Finished);
    }

    #[test]
    fn test_finished_cursor_stays_finished() {
        let schedule = FrameSchedule::new(200, 100, TailPolicy::Truncate).unwrap();
        let mut cursor = FrameCursor::new(schedule);
        assert!(cursor.advance().is_some());
        assert_eq!(cursor.state(), DriverState::Running);
        assert!(cursor.advance().is_some());
        assert!(cursor.is_finished());
        assert!(cursor.advance().is_none());
        assert!(cursor.advance().is_none());
        assert_eq!(cursor.next_frame(), 2);
    }

    #[test]
    fn test_empty_schedule_finishes_immediately() {
        let schedule = FrameSchedule::new(50, 100, TailPolicy::Truncate).unwrap();
        let mut cursor = FrameCursor::new(schedule);
        assert!(cursor.advance().is_none());
        assert!(cursor.is_finished());
    }
}
