//! Rendering configuration
//!
//! Stored as JSON. Missing fields fall back to the reference values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VizError};

/// Timesteps revealed per animation frame
pub const DEFAULT_STRIDE: usize = 100;

/// Delay between animation frames in milliseconds
pub const DEFAULT_FRAME_DELAY_MS: u32 = 200;

/// Smallest width or height of any rendered image
///
/// Figures with many panels need more; the renderers check the full layout.
pub const MIN_IMAGE_SIDE: u32 = 96;

/// What to do with the samples after the last full stride
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TailPolicy {
    /// Emit `floor(T / stride)` frames; the trailing `T mod stride` samples are never shown
    #[default]
    Truncate,
    /// Emit one extra frame revealing the full series
    RevealTail,
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Timesteps revealed per frame
    pub stride: usize,
    /// Delay between frames (ms)
    pub frame_delay_ms: u32,
    /// Animation width in pixels
    pub width: u32,
    /// Animation height in pixels
    pub height: u32,
    /// Static trace width in pixels
    pub trace_width: u32,
    /// Static trace height in pixels
    pub trace_height: u32,
    /// Handling of the partial window after the last full stride
    pub tail_policy: TailPolicy,
    /// Directory artifacts are written to
    pub output_dir: PathBuf,
    /// Animation file name
    pub animation_file: String,
    /// Static trace file name
    pub trace_file: String,
    /// Write a JSON manifest next to every artifact
    pub write_manifest: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl RenderConfig {
    /// Reference output: 100 steps per frame, 200 ms per frame, `test.gif`
    pub fn reference() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            width: 1200,
            height: 1800,
            trace_width: 1000,
            trace_height: 600,
            tail_policy: TailPolicy::Truncate,
            output_dir: PathBuf::from("."),
            animation_file: "test.gif".to_string(),
            trace_file: "trace.png".to_string(),
            write_manifest: true,
        }
    }

    /// Small, fast output for previews and tests
    pub fn preview() -> Self {
        Self {
            width: 480,
            height: 720,
            trace_width: 480,
            trace_height: 300,
            frame_delay_ms: 100,
            ..Self::reference()
        }
    }

    /// Builder-style output directory override
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder-style stride override
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Full path of the animation artifact
    pub fn animation_path(&self) -> PathBuf {
        self.output_dir.join(&self.animation_file)
    }

    /// Full path of the static trace artifact
    pub fn trace_path(&self) -> PathBuf {
        self.output_dir.join(&self.trace_file)
    }

    /// Check the configuration can produce an artifact
    pub fn validate(&self) -> Result<()> {
        if self.stride == 0 {
            return Err(VizError::parameter("stride must be at least 1"));
        }
        if self.width.min(self.height) < MIN_IMAGE_SIDE {
            return Err(VizError::parameter(format!(
                "animation size {}x{} is below {} pixels",
                self.width, self.height, MIN_IMAGE_SIDE
            )));
        }
        if self.trace_width.min(self.trace_height) < MIN_IMAGE_SIDE {
            return Err(VizError::parameter(format!(
                "trace size {}x{} is below {} pixels",
                self.trace_width, self.trace_height, MIN_IMAGE_SIDE
            )));
        }
        if self.animation_file.trim().is_empty() || self.trace_file.trim().is_empty() {
            return Err(VizError::parameter("artifact file names must not be empty"));
        }
        Ok(())
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VizError::RecordingNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        let config: RenderConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_reference_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.stride, 100);
        assert_eq!(config.frame_delay_ms, 200);
        assert_eq!(config.tail_policy, TailPolicy::Truncate);
        assert_eq!(config.animation_path(), PathBuf::from("./test.gif"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"stride": 50, "tail_policy": "reveal-tail"}"#).unwrap();
        assert_eq!(config.stride, 50);
        assert_eq!(config.tail_policy, TailPolicy::RevealTail);
        assert_eq!(config.frame_delay_ms, DEFAULT_FRAME_DELAY_MS);
    }

    #[test]
    fn test_validate_rejects_zero_stride() {
        let config = RenderConfig::preview().with_stride(0);
        assert!(matches!(
            config.validate(),
            Err(VizError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_tiny_images() {
        let tiny = [
            RenderConfig { height: 60, ..RenderConfig::preview() },
            RenderConfig { width: 8, height: 8, ..RenderConfig::preview() },
            RenderConfig { trace_width: 0, ..RenderConfig::preview() },
            RenderConfig { trace_height: MIN_IMAGE_SIDE - 1, ..RenderConfig::preview() },
        ];
        for config in tiny {
            assert!(matches!(
                config.validate(),
                Err(VizError::InvalidParameter { .. })
            ));
        }

        let smallest = RenderConfig {
            width: MIN_IMAGE_SIDE,
            height: MIN_IMAGE_SIDE,
            trace_width: MIN_IMAGE_SIDE,
            trace_height: MIN_IMAGE_SIDE,
            ..RenderConfig::preview()
        };
        assert!(smallest.validate().is_ok());
    }

    #[test]
    fn test_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("render.json");

        let config = RenderConfig::preview().with_output_dir(dir.path());
        config.save(&path).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap(), config);
    }
}
