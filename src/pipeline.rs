//! Render Pipeline
//!
//! One pass from engine to artifact:
//! session -> run -> resolve -> label -> layout -> render -> persist -> release.
//!
//! The engine is acquired first so that every exit, including argument
//! validation failures, deinitializes it exactly once.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::RenderConfig;
use crate::engine::{EngineSession, RunRequest, TimeAxis, VoltageBuffer, VoltageEngine};
use crate::error::{Result, VizError};
use crate::render::{
    write_animation, ArtifactKind, ArtifactManifest, FrameSchedule, GifOptions,
    SingleTraceRenderer, TraceGrid,
};
use crate::topology::{NeuronDescriptor, TopologyLabeler};

/// What a render pass produced
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// Kind of artifact rendered
    pub kind: ArtifactKind,
    /// Artifact path, `None` when nothing was written
    pub artifact: Option<PathBuf>,
    /// Manifest path, `None` when disabled or nothing was written
    pub manifest: Option<PathBuf>,
    /// Frames in the artifact (1 for a static trace)
    pub frame_count: usize,
    /// SHA-256 of the engine buffer
    pub buffer_sha256: String,
}

/// Run `engine` once and animate every neuron's trace
///
/// Writes `config.animation_path()` plus its manifest. When the run is
/// shorter than one stride nothing is written and `artifact` is `None`.
pub fn render_animation<E: VoltageEngine>(
    engine: E,
    request: &RunRequest,
    config: &RenderConfig,
) -> Result<RenderOutcome> {
    let mut session = EngineSession::acquire(engine);

    config.validate()?;
    let schedule = FrameSchedule::new(request.num_steps, config.stride, config.tail_policy)?;
    let time = TimeAxis::new(request.num_steps, request.dt)?;

    let buffer = session.run(request)?;
    let descriptors = TopologyLabeler::new().label(&request.layer_sizes);
    let path = config.animation_path();

    info!(
        "[PIPELINE] Animating {} panels, {} frames -> {}",
        descriptors.len(),
        schedule.frame_count(),
        path.display()
    );

    let frame_count = {
        let series = buffer.resolve(request.num_neurons(), request.num_steps)?;
        let grid = TraceGrid::new(&descriptors, series, &time, request.input_current)?;
        let options = GifOptions {
            size: (config.width, config.height),
            frame_delay_ms: config.frame_delay_ms,
        };
        write_animation(&grid, schedule, options, &path)?
    };

    let mut outcome = RenderOutcome {
        kind: ArtifactKind::Animation,
        artifact: None,
        manifest: None,
        frame_count,
        buffer_sha256: buffer.checksum(),
    };

    if frame_count > 0 {
        if config.write_manifest {
            let manifest = ArtifactManifest::new(
                ArtifactKind::Animation,
                &path,
                request,
                outcome.buffer_sha256.clone(),
                &descriptors,
            )
            .with_frames(frame_count, config.stride);
            outcome.manifest = Some(write_manifest_or_discard(&manifest, &path)?);
        }
        outcome.artifact = Some(path);
    } else {
        warn!("[PIPELINE] No frames rendered, no artifact written");
    }

    session.release();
    Ok(outcome)
}

/// Run `engine` once and plot a single neuron's full trace
///
/// `neuron` is a global index and defaults to the output neuron `N - 1`.
pub fn render_trace<E: VoltageEngine>(
    engine: E,
    request: &RunRequest,
    config: &RenderConfig,
    neuron: Option<usize>,
) -> Result<RenderOutcome> {
    let mut session = EngineSession::acquire(engine);

    config.validate()?;
    let descriptor = select_neuron(request, neuron)?;
    let time = TimeAxis::new(request.num_steps, request.dt)?;

    let buffer = session.run(request)?;
    let path = config.trace_path();

    info!(
        "[PIPELINE] Plotting {} -> {}",
        descriptor.label,
        path.display()
    );
    render_single(&buffer, request, &descriptor, &time, config, &path)?;

    let buffer_sha256 = buffer.checksum();
    let manifest = if config.write_manifest {
        let manifest = ArtifactManifest::new(
            ArtifactKind::Trace,
            &path,
            request,
            buffer_sha256.clone(),
            [&descriptor],
        )
        .with_frames(1, config.stride);
        Some(write_manifest_or_discard(&manifest, &path)?)
    } else {
        None
    };

    session.release();
    Ok(RenderOutcome {
        kind: ArtifactKind::Trace,
        artifact: Some(path),
        manifest,
        frame_count: 1,
        buffer_sha256,
    })
}

/// Descriptor of `neuron`, or of the output neuron when `None`
fn select_neuron(request: &RunRequest, neuron: Option<usize>) -> Result<NeuronDescriptor> {
    let sizes = &request.layer_sizes;
    let index = neuron.unwrap_or(sizes.num_neurons() - 1);
    TopologyLabeler::new().describe(sizes, index).ok_or_else(|| {
        VizError::parameter(format!(
            "neuron {} out of range for {} neurons",
            index,
            sizes.num_neurons()
        ))
    })
}

fn render_single(
    buffer: &VoltageBuffer,
    request: &RunRequest,
    descriptor: &NeuronDescriptor,
    time: &TimeAxis,
    config: &RenderConfig,
    path: &Path,
) -> Result<()> {
    let series = buffer.resolve(request.num_neurons(), request.num_steps)?;
    let trace = series.trace(descriptor.global_index).ok_or_else(|| {
        VizError::parameter(format!("neuron {} has no trace", descriptor.global_index))
    })?;

    SingleTraceRenderer::new(descriptor, trace, time, request.input_current, config.stride)?
        .render_png(path, (config.trace_width, config.trace_height))
}

/// Write the manifest; if that fails, remove the artifact it describes
fn write_manifest_or_discard(manifest: &ArtifactManifest, artifact: &Path) -> Result<PathBuf> {
    manifest.write_beside(artifact).map_err(|e| {
        if let Err(remove) = fs::remove_file(artifact) {
            warn!(
                "[PIPELINE] Could not remove {}: {}",
                artifact.display(),
                remove
            );
        }
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TailPolicy;
    use crate::engine::generate_test_recording;
    use crate::engine::session::tests::CountingEngine;
    use crate::topology::LayerSizes;
    use tempfile::tempdir;

    fn small_request() -> RunRequest {
        RunRequest::new(0.451, 0.01, 300, LayerSizes::new(&[2, 1]).unwrap())
    }

    fn fixture_samples(request: &RunRequest) -> Vec<f64> {
        generate_test_recording(request).unwrap().voltages
    }

    fn config_in(dir: &Path) -> RenderConfig {
        RenderConfig {
            width: 240,
            height: 240,
            trace_width: 320,
            trace_height: 200,
            ..RenderConfig::preview()
        }
        .with_output_dir(dir)
    }

    fn dir_is_empty(dir: &Path) -> bool {
        fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_animation_success_releases_once() {
        let dir = tempdir().unwrap();
        let request = small_request();
        let engine = CountingEngine::new(Some(fixture_samples(&request)));
        let (runs, releases) = (engine.runs.clone(), engine.releases.clone());

        let outcome = render_animation(engine, &request, &config_in(dir.path())).unwrap();

        assert_eq!(runs.get(), 1);
        assert_eq!(releases.get(), 1);
        assert_eq!(outcome.frame_count, 3);
        assert!(outcome.artifact.unwrap().exists());
        assert!(outcome.manifest.unwrap().exists());
    }

    #[test]
    fn test_engine_failure_releases_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let engine = CountingEngine::new(None);
        let releases = engine.releases.clone();

        let result = render_animation(engine, &small_request(), &config_in(dir.path()));

        assert!(matches!(result, Err(VizError::EngineCallFailure { .. })));
        assert_eq!(releases.get(), 1);
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn test_resolver_failure_releases_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let engine = CountingEngine::new(Some(vec![-65.0; 899]));
        let releases = engine.releases.clone();

        match render_animation(engine, &small_request(), &config_in(dir.path())) {
            Err(VizError::BufferLengthMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 900);
                assert_eq!(actual, 899);
            }
            other => panic!("Expected BufferLengthMismatch, got: {:?}", other),
        }
        assert_eq!(releases.get(), 1);
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn test_invalid_config_still_releases() {
        let dir = tempdir().unwrap();
        let engine = CountingEngine::new(Some(vec![]));
        let (runs, releases) = (engine.runs.clone(), engine.releases.clone());

        let config = config_in(dir.path()).with_stride(0);
        assert!(render_animation(engine, &small_request(), &config).is_err());
        assert_eq!(runs.get(), 0);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_short_run_writes_no_animation() {
        let dir = tempdir().unwrap();
        let request = RunRequest::new(0.451, 0.01, 50, LayerSizes::new(&[2, 1]).unwrap());
        let engine = CountingEngine::new(Some(fixture_samples(&request)));

        let outcome = render_animation(engine, &request, &config_in(dir.path())).unwrap();
        assert_eq!(outcome.frame_count, 0);
        assert!(outcome.artifact.is_none());
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn test_reveal_tail_adds_final_frame() {
        let dir = tempdir().unwrap();
        let request = RunRequest::new(0.451, 0.01, 250, LayerSizes::new(&[1]).unwrap());
        let engine = CountingEngine::new(Some(fixture_samples(&request)));

        let mut config = config_in(dir.path());
        config.tail_policy = TailPolicy::RevealTail;
        config.write_manifest = false;

        let outcome = render_animation(engine, &request, &config).unwrap();
        assert_eq!(outcome.frame_count, 3);
        assert!(outcome.manifest.is_none());
    }

    #[test]
    fn test_trace_defaults_to_output_neuron() {
        let dir = tempdir().unwrap();
        let request = small_request();
        let engine = CountingEngine::new(Some(fixture_samples(&request)));
        let releases = engine.releases.clone();

        let outcome = render_trace(engine, &request, &config_in(dir.path()), None).unwrap();
        assert_eq!(releases.get(), 1);
        assert_eq!(outcome.frame_count, 1);

        let manifest = ArtifactManifest::load(&outcome.manifest.unwrap()).unwrap();
        assert_eq!(manifest.panels.len(), 1);
        assert_eq!(manifest.panels[0].label, "L2 N0");
    }

    #[test]
    fn test_trace_rejects_unknown_neuron() {
        let dir = tempdir().unwrap();
        let request = small_request();
        let engine = CountingEngine::new(Some(fixture_samples(&request)));
        let (runs, releases) = (engine.runs.clone(), engine.releases.clone());

        let result = render_trace(engine, &request, &config_in(dir.path()), Some(3));
        assert!(matches!(result, Err(VizError::InvalidParameter { .. })));
        assert_eq!(runs.get(), 0);
        assert_eq!(releases.get(), 1);
        assert!(dir_is_empty(dir.path()));
    }
}
