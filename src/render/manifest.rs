//! Artifact manifests
//!
//! Every rendered artifact can carry a JSON sidecar (`<artifact>.json`) that
//! records the run it was drawn from and, per panel, the label and color it
//! was drawn with. Images lose text fidelity; the manifest does not.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::RunRequest;
use crate::error::Result;
use crate::topology::{LayerSizes, NeuronDescriptor, TraceColor};

/// Kind of rendered artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Animated GIF of every panel
    Animation,
    /// Static PNG of one neuron
    Trace,
}

/// Label and color of one drawn panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRecord {
    pub global_index: usize,
    pub layer_index: usize,
    pub index_in_layer: usize,
    pub label: String,
    pub color: TraceColor,
    /// `#rrggbb`
    pub rgb: String,
}

impl From<&NeuronDescriptor> for PanelRecord {
    fn from(descriptor: &NeuronDescriptor) -> Self {
        Self {
            global_index: descriptor.global_index,
            layer_index: descriptor.layer_index,
            index_in_layer: descriptor.index_in_layer,
            label: descriptor.label.clone(),
            color: descriptor.color,
            rgb: descriptor.color.hex(),
        }
    }
}

/// Sidecar describing a rendered artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub render_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub kind: ArtifactKind,
    /// File name of the artifact
    pub artifact: String,
    pub frame_count: usize,
    pub stride: usize,
    pub num_steps: usize,
    pub dt: f64,
    pub input_current: f64,
    pub layer_sizes: LayerSizes,
    /// SHA-256 of the voltage buffer the artifact was drawn from
    pub buffer_sha256: String,
    pub panels: Vec<PanelRecord>,
}

impl ArtifactManifest {
    /// Describe an artifact rendered from `request`
    pub fn new<'d>(
        kind: ArtifactKind,
        artifact: &Path,
        request: &RunRequest,
        buffer_sha256: String,
        panels: impl IntoIterator<Item = &'d NeuronDescriptor>,
    ) -> Self {
        let artifact = artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            render_id: Uuid::new_v4(),
            created_at: Utc::now(),
            kind,
            artifact,
            frame_count: 0,
            stride: 0,
            num_steps: request.num_steps,
            dt: request.dt,
            input_current: request.input_current,
            layer_sizes: request.layer_sizes.clone(),
            buffer_sha256,
            panels: panels.into_iter().map(PanelRecord::from).collect(),
        }
    }

    /// Builder-style frame information
    pub fn with_frames(mut self, frame_count: usize, stride: usize) -> Self {
        self.frame_count = frame_count;
        self.stride = stride;
        self
    }

    /// Sidecar path of `artifact`: the artifact path with `.json` appended
    pub fn path_for(artifact: &Path) -> PathBuf {
        let mut name = artifact.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }

    /// Write the manifest as pretty JSON next to `artifact`
    pub fn write_beside(&self, artifact: &Path) -> Result<PathBuf> {
        let path = Self::path_for(artifact);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        debug!("[MANIFEST] Wrote {}", path.display());
        Ok(path)
    }

    /// Read a manifest
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::TopologyLabeler;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_path_for_appends_json() {
        assert_eq!(
            ArtifactManifest::path_for(Path::new("/tmp/out/test.gif")),
            PathBuf::from("/tmp/out/test.gif.json")
        );
    }

    #[test]
    fn test_manifest_records_every_panel() {
        let request = RunRequest::default();
        let descriptors = TopologyLabeler::new().label(&request.layer_sizes);
        let manifest = ArtifactManifest::new(
            ArtifactKind::Animation,
            Path::new("out/test.gif"),
            &request,
            "abc".to_string(),
            &descriptors,
        )
        .with_frames(100, 100);

        assert_eq!(manifest.artifact, "test.gif");
        assert_eq!(manifest.panels.len(), 21);
        assert_eq!(manifest.panels[16].label, "L2 N0 -> L3 N0");
        assert_eq!(manifest.panels[16].color, TraceColor::Orange);
        assert_eq!(manifest.panels[16].rgb, TraceColor::Orange.hex());
        assert_eq!(manifest.frame_count, 100);
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("trace.png");
        let request = RunRequest::default();
        let descriptors = TopologyLabeler::new().label(&request.layer_sizes);

        let manifest = ArtifactManifest::new(
            ArtifactKind::Trace,
            &artifact,
            &request,
            "abc".to_string(),
            descriptors.last(),
        );
        let path = manifest.write_beside(&artifact).unwrap();

        let loaded = ArtifactManifest::load(&path).unwrap();
        assert_eq!(loaded.kind, ArtifactKind::Trace);
        assert_eq!(loaded.panels.len(), 1);
        assert_eq!(loaded.panels[0].label, "L3 N0");
        assert_eq!(loaded.render_id, manifest.render_id);
    }
}
