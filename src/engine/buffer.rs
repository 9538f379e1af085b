//! Voltage Buffer Layout
//!
//! The engine hands back one flat buffer with no embedded metadata. Neuron
//! `i` of `N` occupies the half-open slice `[i*T, (i+1)*T)`, neurons ordered
//! layer-major. This module checks that shape and hands out zero-copy
//! per-neuron slices.

use sha2::{Digest, Sha256};

use crate::error::{Result, VizError};

// ============================================================================
// Constants
// ============================================================================

/// Integration step of the reference run in milliseconds
pub const DEFAULT_DT_MS: f64 = 0.01;

/// Number of steps of the reference run
pub const DEFAULT_NUM_STEPS: usize = 10_000;

/// Clamp current injected into the first layer of the reference run (uA)
pub const DEFAULT_INPUT_CURRENT: f64 = 0.451;

// ============================================================================
// Voltage Buffer
// ============================================================================

/// Owned flat voltage history as returned by the engine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VoltageBuffer {
    samples: Vec<f64>,
}

impl VoltageBuffer {
    /// Wrap an engine buffer
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in engine order
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Consume the buffer and return the raw samples
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Resolve this buffer against the expected dimensions
    pub fn resolve(&self, num_neurons: usize, num_steps: usize) -> Result<ResolvedBuffer<'_>> {
        ResolvedBuffer::new(&self.samples, num_neurons, num_steps)
    }

    /// SHA-256 checksum over the little-endian bytes of every sample
    pub fn checksum(&self) -> String {
        checksum_samples(&self.samples)
    }
}

impl From<Vec<f64>> for VoltageBuffer {
    fn from(samples: Vec<f64>) -> Self {
        Self::new(samples)
    }
}

/// SHA-256 checksum over the little-endian bytes of every sample
pub fn checksum_samples(samples: &[f64]) -> String {
    let mut hasher = Sha256::new();
    for sample in samples {
        hasher.update(sample.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// Buffer Layout
// ============================================================================

/// Shape of a layer-major voltage buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    /// Number of neurons N
    pub num_neurons: usize,
    /// Number of timesteps T per neuron
    pub num_steps: usize,
}

impl BufferLayout {
    /// Create a layout
    pub fn new(num_neurons: usize, num_steps: usize) -> Self {
        Self {
            num_neurons,
            num_steps,
        }
    }

    /// Expected buffer length N*T, `None` if it overflows `usize`
    pub fn expected_len(&self) -> Option<usize> {
        self.num_neurons.checked_mul(self.num_steps)
    }

    /// Sample range of neuron `index`, `None` if out of range
    pub fn range_of(&self, index: usize) -> Option<std::ops::Range<usize>> {
        if index >= self.num_neurons {
            return None;
        }
        let start = index.checked_mul(self.num_steps)?;
        Some(start..start.checked_add(self.num_steps)?)
    }

    /// Check that a buffer of length `actual` conforms to this layout
    ///
    /// # Errors
    /// * `InvalidParameter` - if N*T is not addressable
    /// * `BufferLengthMismatch` - if `actual != N*T`
    pub fn check(&self, actual: usize) -> Result<()> {
        let expected = self.expected_len().ok_or_else(|| {
            VizError::parameter(format!(
                "{} neurons x {} steps exceeds the addressable buffer length",
                self.num_neurons, self.num_steps
            ))
        })?;
        if actual != expected {
            return Err(VizError::BufferLengthMismatch {
                expected,
                actual,
                num_neurons: self.num_neurons,
                num_steps: self.num_steps,
            });
        }
        Ok(())
    }
}

/// A buffer whose length has been checked against its layout
///
/// Borrowing only; obtaining a trace is O(1) and copies nothing.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedBuffer<'a> {
    samples: &'a [f64],
    layout: BufferLayout,
}

impl<'a> ResolvedBuffer<'a> {
    /// Resolve a flat buffer into `num_neurons` traces of `num_steps` samples
    ///
    /// # Errors
    /// * `InvalidParameter` - if `num_neurons * num_steps` overflows `usize`
    /// * `BufferLengthMismatch` - if `samples.len() != num_neurons * num_steps`
    pub fn new(samples: &'a [f64], num_neurons: usize, num_steps: usize) -> Result<Self> {
        let layout = BufferLayout::new(num_neurons, num_steps);
        layout.check(samples.len())?;
        Ok(Self { samples, layout })
    }

    /// Layout this buffer was resolved against
    pub fn layout(&self) -> BufferLayout {
        self.layout
    }

    /// Number of neurons N
    pub fn num_neurons(&self) -> usize {
        self.layout.num_neurons
    }

    /// Number of timesteps T
    pub fn num_steps(&self) -> usize {
        self.layout.num_steps
    }

    /// Trace of neuron `index`, `None` if out of range
    pub fn trace(&self, index: usize) -> Option<&'a [f64]> {
        self.layout.range_of(index).map(|range| &self.samples[range])
    }

    /// All traces in global-index order
    pub fn traces(&self) -> impl ExactSizeIterator<Item = &'a [f64]> + 'a {
        let steps = self.layout.num_steps;
        let samples = self.samples;
        (0..self.layout.num_neurons).map(move |i| &samples[i * steps..(i + 1) * steps])
    }
}

// ============================================================================
// Time Axis
// ============================================================================

/// Timestamps `t_j = j * dt` shared by every trace
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    times: Vec<f64>,
    dt: f64,
}

impl TimeAxis {
    /// Build the axis for `num_steps` samples spaced `dt` apart
    ///
    /// # Errors
    /// * `InvalidParameter` - if `num_steps` is zero or `dt` is not a positive finite number
    pub fn new(num_steps: usize, dt: f64) -> Result<Self> {
        if num_steps == 0 {
            return Err(VizError::parameter("number of steps must be at least 1"));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(VizError::parameter(format!(
                "time step must be positive and finite, got {}",
                dt
            )));
        }
        let times = (0..num_steps).map(|j| j as f64 * dt).collect();
        Ok(Self { times, dt })
    }

    /// Number of timestamps T
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false for a constructed axis
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time step
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// All timestamps
    pub fn values(&self) -> &[f64] {
        &self.times
    }

    /// First `len` timestamps (clamped to T)
    pub fn prefix(&self, len: usize) -> &[f64] {
        &self.times[..len.min(self.times.len())]
    }

    /// Covered time span `T * dt`
    pub fn duration(&self) -> f64 {
        self.times.len() as f64 * self.dt
    }
}
