//! Engine boundary and scoped session
//!
//! The dynamics engine is external. It is reached through [`VoltageEngine`]
//! and always driven through an [`EngineSession`], which guarantees that the
//! engine runs at most once and is deinitialized exactly once, including on
//! error paths.

use std::time::Instant;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::buffer::{
    VoltageBuffer, DEFAULT_DT_MS, DEFAULT_INPUT_CURRENT, DEFAULT_NUM_STEPS,
};
use crate::error::{Result, VizError};
use crate::topology::LayerSizes;

/// Arguments of one engine call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Clamp current injected into the first layer (uA)
    pub input_current: f64,
    /// Integration step (ms)
    pub dt: f64,
    /// Number of integration steps T
    pub num_steps: usize,
    /// Network topology
    pub layer_sizes: LayerSizes,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            input_current: DEFAULT_INPUT_CURRENT,
            dt: DEFAULT_DT_MS,
            num_steps: DEFAULT_NUM_STEPS,
            layer_sizes: LayerSizes::reference(),
        }
    }
}

impl RunRequest {
    /// Create a request
    pub fn new(input_current: f64, dt: f64, num_steps: usize, layer_sizes: LayerSizes) -> Self {
        Self {
            input_current,
            dt,
            num_steps,
            layer_sizes,
        }
    }

    /// Total neuron count N
    pub fn num_neurons(&self) -> usize {
        self.layer_sizes.num_neurons()
    }

    /// Buffer length the engine must return, `num_steps * N`
    ///
    /// Saturates at `usize::MAX`; [`RunRequest::validate`] rejects such requests.
    pub fn expected_len(&self) -> usize {
        self.num_steps.saturating_mul(self.num_neurons())
    }

    /// Reject requests the engine contract cannot express
    pub fn validate(&self) -> Result<()> {
        if self.num_steps == 0 {
            return Err(VizError::parameter("number of steps must be at least 1"));
        }
        if self.num_steps > i32::MAX as usize {
            return Err(VizError::parameter(format!(
                "number of steps {} exceeds the engine limit",
                self.num_steps
            )));
        }
        if self.num_steps.checked_mul(self.num_neurons()).is_none() {
            return Err(VizError::parameter(format!(
                "{} steps over {} neurons exceeds the addressable buffer length",
                self.num_steps,
                self.num_neurons()
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(VizError::parameter(format!(
                "time step must be positive and finite, got {}",
                self.dt
            )));
        }
        if !self.input_current.is_finite() {
            return Err(VizError::parameter("input current must be finite"));
        }
        Ok(())
    }
}

/// External dynamics engine
///
/// `run` returns `num_steps * sum(layer_sizes)` samples, layer-major and
/// neuron-major within each layer. Engines are assumed non-idempotent: once
/// `run` has been called the engine must be deinitialized before reuse.
pub trait VoltageEngine {
    /// Integrate the network and return the complete voltage history
    fn run(&mut self, request: &RunRequest) -> Result<Vec<f64>>;

    /// Release every resource the engine holds
    fn deinitialize(&mut self);

    /// Human-readable engine name for logs
    fn name(&self) -> &str;
}

impl<E: VoltageEngine + ?Sized> VoltageEngine for Box<E> {
    fn run(&mut self, request: &RunRequest) -> Result<Vec<f64>> {
        (**self).run(request)
    }

    fn deinitialize(&mut self) {
        (**self).deinitialize()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Engine acquired, not yet run
    Acquired,
    /// Engine has produced its buffer (or failed trying)
    Invoked,
    /// Engine deinitialized
    Released,
}

/// Scoped engine handle
///
/// Acquire on entry, release exactly once on exit. Dropping an unreleased
/// session deinitializes the engine.
pub struct EngineSession<E: VoltageEngine> {
    engine: E,
    state: SessionState,
}

impl<E: VoltageEngine> EngineSession<E> {
    /// Take ownership of a loaded engine
    pub fn acquire(engine: E) -> Self {
        debug!("[ENGINE] Acquired {}", engine.name());
        Self {
            engine,
            state: SessionState::Acquired,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the engine once
    ///
    /// # Errors
    /// * `EngineCallFailure` - if the engine fails, returns an empty buffer, or
    ///   has already been invoked in this session
    pub fn run(&mut self, request: &RunRequest) -> Result<VoltageBuffer> {
        match self.state {
            SessionState::Acquired => {}
            SessionState::Invoked => {
                return Err(VizError::engine("engine already invoked in this session"));
            }
            SessionState::Released => {
                return Err(VizError::engine("engine session already released"));
            }
        }
        request.validate()?;

        // A failed call still counts: the engine is not safe to call twice
        self.state = SessionState::Invoked;

        info!(
            "[ENGINE] Running {} for {} steps over {} (I={} uA, dt={} ms)",
            self.engine.name(),
            request.num_steps,
            request.layer_sizes,
            request.input_current,
            request.dt
        );
        let start = Instant::now();

        let samples = self.engine.run(request).map_err(|e| match e {
            VizError::EngineCallFailure { .. } => e,
            other => VizError::engine(other.to_string()),
        })?;

        if samples.is_empty() {
            return Err(VizError::engine("engine returned an empty buffer"));
        }

        info!(
            "[ENGINE] {} returned {} samples in {:.3}s",
            self.engine.name(),
            samples.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(VoltageBuffer::new(samples))
    }

    /// Deinitialize the engine
    ///
    /// Consumes the session so it cannot be released twice.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.state == SessionState::Released {
            return;
        }
        if self.state == SessionState::Acquired {
            warn!("[ENGINE] Releasing {} without running it", self.engine.name());
        }
        self.engine.deinitialize();
        self.state = SessionState::Released;
        debug!("[ENGINE] Released {}", self.engine.name());
    }
}

impl<E: VoltageEngine> Drop for EngineSession<E> {
    fn drop(&mut self) {
        self.release_inner();
    }
}
