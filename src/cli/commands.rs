//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::RenderConfig;
use crate::engine::{generate_test_recording, RecordedEngine, RunRequest, VoltageRecording};
use crate::error::{Result, VizError};
use crate::pipeline::{render_animation, render_trace, RenderOutcome};
use crate::topology::{LayerSizes, TopologyLabeler};

/// Generate a synthetic recording.
pub fn synth(output: &Path, layers: &[i32], steps: usize, dt: f64, current: f64) -> Result<()> {
    let sizes = LayerSizes::new(layers)?;
    info!("Generating {} steps for layers {}", steps, sizes);

    let request = RunRequest::new(current, dt, steps, sizes);
    let recording = generate_test_recording(&request)?;
    recording.save(output)?;

    println!("Recording written: {}", output.display());
    println!("Neurons: {}", request.num_neurons());
    println!("Samples: {}", recording.voltages.len());
    println!("SHA-256: {}", recording.checksum());

    Ok(())
}

/// Animate every neuron of a recording.
pub fn animate(
    recording: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    stride: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(stride) = stride {
        config = config.with_stride(stride);
    }
    if let Some(output) = output {
        let (dir, file) = split_output(output)?;
        config.output_dir = dir;
        config.animation_file = file;
    }

    let (engine, request) = open_recording(recording)?;
    let outcome = render_animation(engine, &request, &config)?;

    match &outcome.artifact {
        Some(path) => {
            println!("Animation written: {}", path.display());
            println!("Frames: {}", outcome.frame_count);
        }
        None => {
            warn!("Nothing rendered");
            println!(
                "No frames: {} steps is shorter than one stride of {}",
                request.num_steps, config.stride
            );
        }
    }
    print_manifest(&outcome);

    Ok(())
}

/// Plot one neuron's full trace.
pub fn trace(
    recording: &Path,
    neuron: Option<usize>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(output) = output {
        let (dir, file) = split_output(output)?;
        config.output_dir = dir;
        config.trace_file = file;
    }

    let (engine, request) = open_recording(recording)?;
    let outcome = render_trace(engine, &request, &config, neuron)?;

    if let Some(path) = &outcome.artifact {
        println!("Trace written: {}", path.display());
    }
    print_manifest(&outcome);

    Ok(())
}

/// Print the neuron descriptor table of a recording.
pub fn describe(recording: &Path) -> Result<()> {
    info!("Describing recording: {}", recording.display());

    let recording = VoltageRecording::load(recording)?;
    let request = recording.request();
    let descriptors = TopologyLabeler::new().label(&recording.layer_sizes);

    println!("Layers: {}", recording.layer_sizes);
    println!("Neurons: {}", request.num_neurons());
    println!(
        "Steps: {} (dt = {} ms, {} ms total)",
        recording.num_steps,
        recording.dt,
        recording.num_steps as f64 * recording.dt
    );
    println!("Input current: {} uA", recording.input_current);
    println!("SHA-256: {}", recording.checksum());

    let expected = request.expected_len();
    if recording.voltages.len() == expected {
        println!("Buffer: {} samples (conforming)", expected);
    } else {
        println!(
            "Buffer: {} samples, expected {} (will not resolve)",
            recording.voltages.len(),
            expected
        );
    }

    println!();
    println!(
        "{:>5}  {:>5}  {:>5}  {:<11}  {:<8}  Label",
        "Index", "Layer", "N", "Color", "RGB"
    );
    println!("{:-<60}", "");
    for descriptor in &descriptors {
        println!(
            "{:>5}  {:>5}  {:>5}  {:<11}  {:<8}  {}",
            descriptor.global_index,
            descriptor.layer_index + 1,
            descriptor.index_in_layer,
            descriptor.color.name(),
            descriptor.color.hex(),
            descriptor.label
        );
    }

    Ok(())
}

/// Write the default render configuration.
pub fn init_config(path: &Path) -> Result<()> {
    info!("Writing default configuration: {}", path.display());

    RenderConfig::reference().save(path)?;
    println!("Configuration written: {}", path.display());

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    match path {
        Some(path) => RenderConfig::load(path),
        None => Ok(RenderConfig::reference()),
    }
}

fn open_recording(path: &Path) -> Result<(RecordedEngine, RunRequest)> {
    info!("Opening recording: {}", path.display());

    let engine = RecordedEngine::from_path(path)?;
    let request = engine
        .request()
        .ok_or_else(|| VizError::engine("recording holds no run"))?;
    Ok((engine, request))
}

/// Split an output path into the directory and file name the config expects
fn split_output(output: &Path) -> Result<(PathBuf, String)> {
    let file = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            VizError::parameter(format!("output {} has no file name", output.display()))
        })?;
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file))
}

fn print_manifest(outcome: &RenderOutcome) {
    if let Some(manifest) = &outcome.manifest {
        println!("Manifest: {}", manifest.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_split_output() {
        let (dir, file) = split_output(Path::new("out/anim.gif")).unwrap();
        assert_eq!(dir, PathBuf::from("out"));
        assert_eq!(file, "anim.gif");

        let (dir, file) = split_output(Path::new("anim.gif")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "anim.gif");

        assert!(split_output(Path::new("/")).is_err());
    }

    #[test]
    fn test_synth_then_trace() {
        let dir = tempdir().unwrap();
        let recording = dir.path().join("run.json");
        let output = dir.path().join("neuron.png");

        synth(&recording, &[2, 1], 200, 0.01, 0.451).unwrap();
        trace(&recording, Some(0), None, Some(&output)).unwrap();

        assert!(output.exists());
        assert!(dir.path().join("neuron.png.json").exists());
    }

    #[test]
    fn test_synth_rejects_bad_layers() {
        let dir = tempdir().unwrap();
        let result = synth(&dir.path().join("run.json"), &[16, 0, 1], 10, 0.01, 0.451);
        assert!(matches!(result, Err(VizError::InvalidTopology { .. })));
    }

    #[test]
    fn test_animate_missing_recording() {
        let result = animate(Path::new("/nonexistent/run.json"), None, None, None);
        assert!(matches!(result, Err(VizError::RecordingNotFound { .. })));
    }

    #[test]
    fn test_init_config_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("render.json");
        init_config(&path).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap(), RenderConfig::reference());
    }
}
