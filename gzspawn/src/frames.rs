//! Static frame graph transform provider.
//!
//! Frames are declared in a YAML or TOML file, each with a parent and a
//! fixed transform. Lookup composes the parent chain from the requested
//! frame up to the target. Roll and pitch are representable here since
//! the graph is a general transform store; the yaw-only guard lives in
//! the pose transformer.

use anyhow::{bail, Context, Result};
use gzspawn_core::{LookupError, TransformLookup, WorldTransform, WORLD_FRAME};
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FramesFile {
    #[serde(default)]
    frames: Vec<FrameDef>,
}

/// One frame declaration. Omitted fields default to the identity
/// transform under the world frame.
#[derive(Debug, Deserialize)]
struct FrameDef {
    frame: String,
    #[serde(default = "default_parent")]
    parent: String,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default)]
    roll: f64,
    #[serde(default)]
    pitch: f64,
    #[serde(default)]
    yaw: f64,
}

fn default_parent() -> String {
    WORLD_FRAME.to_string()
}

/// Transform provider over a fixed set of named frames.
#[derive(Debug)]
pub struct StaticFrameGraph {
    /// frame -> (parent, parent-from-frame transform)
    frames: HashMap<String, (String, Isometry3<f64>)>,
}

impl StaticFrameGraph {
    /// Graph with no frames; every non-world lookup fails.
    pub fn empty() -> Self {
        Self {
            frames: HashMap::new(),
        }
    }

    /// Load frame definitions from a YAML or TOML file, chosen by
    /// extension. Duplicate frame names are a load error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading frames file {}", path.display()))?;
        let file: FramesFile = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&text)
                .with_context(|| format!("parsing frames file {}", path.display()))?,
            _ => serde_yaml::from_str(&text)
                .with_context(|| format!("parsing frames file {}", path.display()))?,
        };

        let mut frames = HashMap::new();
        for def in file.frames {
            let transform = Isometry3::from_parts(
                Translation3::new(def.x, def.y, def.z),
                UnitQuaternion::from_euler_angles(def.roll, def.pitch, def.yaw),
            );
            if frames
                .insert(def.frame.clone(), (def.parent, transform))
                .is_some()
            {
                bail!("duplicate frame '{}' in {}", def.frame, path.display());
            }
        }
        Ok(Self { frames })
    }

    /// Compose the chain from `frame` up to `target`.
    fn resolve(&self, target: &str, frame: &str) -> Result<Isometry3<f64>, LookupError> {
        let mut current = frame.to_string();
        let mut acc = Isometry3::identity();
        let mut hops = 0usize;
        while current != target {
            let (parent, transform) = self.frames.get(&current).ok_or_else(|| {
                if current == frame {
                    LookupError::UnknownFrame(current.clone())
                } else {
                    LookupError::Disconnected {
                        frame: frame.to_string(),
                        target: target.to_string(),
                    }
                }
            })?;
            acc = transform * acc;
            current = parent.clone();
            hops += 1;
            // A chain longer than the frame count is a cycle.
            if hops > self.frames.len() {
                return Err(LookupError::Disconnected {
                    frame: frame.to_string(),
                    target: target.to_string(),
                });
            }
        }
        Ok(acc)
    }
}

impl TransformLookup for StaticFrameGraph {
    fn lookup(
        &self,
        target_frame: &str,
        source_frame: &str,
        _timeout: Duration,
    ) -> Result<WorldTransform, LookupError> {
        let transform = self.resolve(target_frame, source_frame)?;
        Ok(WorldTransform::new(transform.translation, transform.rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn write_frames(ext: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("frames.{ext}"));
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_yaml_and_lookup() {
        let (_dir, path) = write_frames(
            "yaml",
            "frames:\n  - frame: takeoff_pad\n    x: 1.0\n    y: 2.0\n    yaw: 1.5707963267948966\n",
        );
        let graph = StaticFrameGraph::load(&path).unwrap();
        let transform = graph.lookup(WORLD_FRAME, "takeoff_pad", TIMEOUT).unwrap();
        assert_relative_eq!(transform.translation.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(transform.translation.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(transform.yaw_only().unwrap(), FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_load_toml() {
        let (_dir, path) = write_frames(
            "toml",
            "[[frames]]\nframe = \"pad\"\nx = 3.0\n\n[[frames]]\nframe = \"corner\"\nparent = \"pad\"\ny = 1.0\n",
        );
        let graph = StaticFrameGraph::load(&path).unwrap();
        let transform = graph.lookup(WORLD_FRAME, "corner", TIMEOUT).unwrap();
        assert_relative_eq!(transform.translation.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(transform.translation.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_chained_frames_compose() {
        let (_dir, path) = write_frames(
            "yaml",
            concat!(
                "frames:\n",
                "  - frame: arena\n",
                "    x: 10.0\n",
                "    yaw: 1.5707963267948966\n",
                "  - frame: pad\n",
                "    parent: arena\n",
                "    x: 2.0\n",
            ),
        );
        let graph = StaticFrameGraph::load(&path).unwrap();
        let transform = graph.lookup(WORLD_FRAME, "pad", TIMEOUT).unwrap();
        // pad offset rotates into +y of the world.
        assert_relative_eq!(transform.translation.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(transform.translation.y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_duplicate_frame_is_load_error() {
        let (_dir, path) = write_frames(
            "yaml",
            "frames:\n  - frame: pad\n  - frame: pad\n    x: 1.0\n",
        );
        let err = StaticFrameGraph::load(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate frame 'pad'"));
    }

    #[test]
    fn test_unknown_frame() {
        let graph = StaticFrameGraph::empty();
        let err = graph.lookup(WORLD_FRAME, "nowhere", TIMEOUT).unwrap_err();
        assert!(matches!(err, LookupError::UnknownFrame(frame) if frame == "nowhere"));
    }

    #[test]
    fn test_disconnected_chain() {
        let (_dir, path) = write_frames(
            "yaml",
            "frames:\n  - frame: pad\n    parent: orphan\n",
        );
        let graph = StaticFrameGraph::load(&path).unwrap();
        let err = graph.lookup(WORLD_FRAME, "pad", TIMEOUT).unwrap_err();
        assert!(matches!(err, LookupError::Disconnected { .. }));
    }
}
