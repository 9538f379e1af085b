//! Engine Boundary Module
//!
//! Everything between the external dynamics engine and the renderer:
//! - Voltage buffer layout resolution and the shared time axis
//! - Scoped engine sessions
//! - Recorded runs and the replay engine

pub mod buffer;
pub mod io;
pub mod session;

pub use buffer::{
    checksum_samples, BufferLayout, ResolvedBuffer, TimeAxis, VoltageBuffer, DEFAULT_DT_MS,
    DEFAULT_INPUT_CURRENT, DEFAULT_NUM_STEPS,
};
pub use io::{generate_test_recording, RecordedEngine, VoltageRecording};
pub use session::{EngineSession, RunRequest, SessionState, VoltageEngine};
