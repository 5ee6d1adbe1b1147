/// Scene configuration for the terminal renderer, loaded from an optional
/// JSON file in which every field may be omitted

use std::fs;
use std::path::Path;

use anyhow::Context;
use pipe3d_core::{CameraConfig, Transform, Vector3D};
use serde::{Deserialize, Serialize};

/// Everything the demo needs to build its first frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Near/far planes, field of view and orthographic extent.
    /// The viewport size is replaced by the terminal size at startup.
    pub camera: CameraConfig,
    /// Initial camera and model state
    pub transform: Transform,
    /// Edge length of the demo cube
    pub cube_size: f64,
    /// Degrees added to the model's Y rotation every frame
    pub spin_degrees: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            transform: Transform {
                position: Vector3D::new(0.0, 0.0, -5.0),
                target: Vector3D::ZERO,
                ..Transform::default()
            },
            cube_size: 2.0,
            spin_degrees: 1.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("Invalid scene configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipe3d_core::{CameraType, DisplayType};

    #[test]
    fn test_empty_object_uses_defaults() {
        let scene = SceneConfig::from_json("{}").unwrap();
        assert_eq!(scene.cube_size, 2.0);
        assert_eq!(scene.transform.position, Vector3D::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_nested_overrides() {
        let scene = SceneConfig::from_json(
            r#"{
                "camera": {"fov_degrees": 60.0},
                "transform": {"camera_type": "PointAt", "display_type": "Orthographic"},
                "cube_size": 3.0
            }"#,
        )
        .unwrap();
        assert_eq!(scene.camera.fov_degrees, 60.0);
        assert_eq!(scene.camera.z_near, 0.1);
        assert_eq!(scene.transform.camera_type, CameraType::PointAt);
        assert_eq!(scene.transform.display_type, DisplayType::Orthographic);
        assert_eq!(scene.cube_size, 3.0);
    }

    #[test]
    fn test_bad_json_is_reported() {
        let err = SceneConfig::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("Invalid scene configuration"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = SceneConfig::load(Path::new("/nonexistent/scene.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read scene file"));
    }
}
