//! Recorded engine runs
//!
//! A [`VoltageRecording`] is a complete engine run (its arguments plus the
//! flat voltage buffer) persisted as JSON. [`RecordedEngine`] replays one
//! through the regular engine boundary so recordings render exactly like live
//! runs.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::engine::buffer::checksum_samples;
use crate::engine::session::{RunRequest, VoltageEngine};
use crate::error::{Result, VizError};
use crate::topology::{LayerSizes, TopologyLabeler};

// Shape of the synthetic action potential, in steps
const RISE_STEPS: usize = 30;
const UPSTROKE_STEPS: usize = 30;
const REPOLARIZE_STEPS: usize = 40;
const RECOVERY_STEPS: usize = 200;

const REST_MV: f64 = -65.0;
const THRESHOLD_MV: f64 = -55.0;
const PEAK_MV: f64 = 40.0;
const UNDERSHOOT_MV: f64 = -75.0;

/// A complete engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageRecording {
    /// Clamp current injected into the first layer (uA)
    pub input_current: f64,
    /// Integration step (ms)
    pub dt: f64,
    /// Number of integration steps T
    pub num_steps: usize,
    /// Network topology
    pub layer_sizes: LayerSizes,
    /// Flat layer-major voltage buffer (mV)
    pub voltages: Vec<f64>,
}

impl VoltageRecording {
    /// Pair an engine request with the buffer it produced
    pub fn new(request: &RunRequest, voltages: Vec<f64>) -> Self {
        Self {
            input_current: request.input_current,
            dt: request.dt,
            num_steps: request.num_steps,
            layer_sizes: request.layer_sizes.clone(),
            voltages,
        }
    }

    /// The engine request this recording answers
    pub fn request(&self) -> RunRequest {
        RunRequest::new(
            self.input_current,
            self.dt,
            self.num_steps,
            self.layer_sizes.clone(),
        )
    }

    /// SHA-256 checksum of the voltage samples
    pub fn checksum(&self) -> String {
        checksum_samples(&self.voltages)
    }

    /// Load a recording from a JSON file
    ///
    /// # Errors
    /// * `RecordingNotFound` - if the file does not exist
    /// * `Serialization` - if the file is not a valid recording
    ///   (including an invalid layer-size sequence)
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VizError::RecordingNotFound {
                path: path.display().to_string(),
            });
        }

        let file = fs::File::open(path)?;
        let recording: VoltageRecording = serde_json::from_reader(BufReader::new(file))?;

        debug!(
            "Loaded recording {} ({} samples, layers {})",
            path.display(),
            recording.voltages.len(),
            recording.layer_sizes
        );
        Ok(recording)
    }

    /// Save the recording as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;

        info!(
            "Saved recording {} ({} samples)",
            path.display(),
            self.voltages.len()
        );
        Ok(())
    }
}

/// Engine that replays a recording
///
/// Only answers the request the recording was made for.
#[derive(Debug)]
pub struct RecordedEngine {
    recording: Option<VoltageRecording>,
}

impl RecordedEngine {
    /// Replay an in-memory recording
    pub fn new(recording: VoltageRecording) -> Self {
        Self {
            recording: Some(recording),
        }
    }

    /// Replay a recording stored on disk
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(VoltageRecording::load(path)?))
    }

    /// The recorded request, `None` once deinitialized
    pub fn request(&self) -> Option<RunRequest> {
        self.recording.as_ref().map(VoltageRecording::request)
    }
}

impl VoltageEngine for RecordedEngine {
    fn run(&mut self, request: &RunRequest) -> Result<Vec<f64>> {
        let recording = self
            .recording
            .as_ref()
            .ok_or_else(|| VizError::engine("recorded engine has been deinitialized"))?;

        if recording.layer_sizes != request.layer_sizes {
            return Err(VizError::engine(format!(
                "recording was made for layers {}, requested {}",
                recording.layer_sizes, request.layer_sizes
            )));
        }
        if recording.num_steps != request.num_steps {
            return Err(VizError::engine(format!(
                "recording holds {} steps, requested {}",
                recording.num_steps, request.num_steps
            )));
        }
        if (recording.dt - request.dt).abs() > f64::EPSILON * recording.dt.abs().max(1.0) {
            return Err(VizError::engine(format!(
                "recording uses dt={}, requested dt={}",
                recording.dt, request.dt
            )));
        }

        Ok(recording.voltages.clone())
    }

    fn deinitialize(&mut self) {
        self.recording = None;
    }

    fn name(&self) -> &str {
        "recorded"
    }
}

/// Generate a deterministic spike-train recording
///
/// Every neuron rests at -65 mV and fires periodic action potentials whose
/// period and phase depend on its layer address, so panels are visually
/// distinct. Used as a fixture for demos and tests.
pub fn generate_test_recording(request: &RunRequest) -> Result<VoltageRecording> {
    request.validate()?;

    let labeler = TopologyLabeler::new();
    let descriptors = labeler.label(&request.layer_sizes);
    let mut voltages = Vec::with_capacity(request.expected_len());

    for descriptor in &descriptors {
        let period = 1_200 + 400 * descriptor.layer_index + 150 * descriptor.index_in_layer;
        let offset = 97 * descriptor.global_index;
        voltages.extend((0..request.num_steps).map(|j| action_potential((j + offset) % period)));
    }

    Ok(VoltageRecording::new(request, voltages))
}

/// Membrane voltage `phase` steps into a firing cycle
fn action_potential(phase: usize) -> f64 {
    let lerp = |from: f64, to: f64, step: usize, steps: usize| {
        from + (to - from) * step as f64 / steps as f64
    };

    let mut p = phase;
    if p < RISE_STEPS {
        return lerp(REST_MV, THRESHOLD_MV, p, RISE_STEPS);
    }
    p -= RISE_STEPS;
    if p < UPSTROKE_STEPS {
        return lerp(THRESHOLD_MV, PEAK_MV, p, UPSTROKE_STEPS);
    }
    p -= UPSTROKE_STEPS;
    if p < REPOLARIZE_STEPS {
        return lerp(PEAK_MV, UNDERSHOOT_MV, p, REPOLARIZE_STEPS);
    }
    p -= REPOLARIZE_STEPS;
    if p < RECOVERY_STEPS {
        return lerp(UNDERSHOOT_MV, REST_MV, p, RECOVERY_STEPS);
    }
    REST_MV
}
