/// Camera configuration and projection utilities
use serde::{Deserialize, Serialize};

use crate::matrix::Matrix;
use crate::vector::Vector3D;

/// |W| below this skips the perspective divide.
///
/// Equivalent to `round(W, 2) == 0`, stated as an explicit band.
pub const W_EPSILON: f64 = 0.005;

/// Projection used by the pipeline's project and viewport stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayType {
    #[default]
    Perspective,
    Orthographic,
}

/// Per-invocation camera configuration.
///
/// Passed by reference into every pipeline run and never mutated there, so
/// independent pipelines can share one value across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub z_near: f64,
    pub z_far: f64,
    pub fov_degrees: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Visible half-height in world units for orthographic display
    pub ortho_half_extent: f64,
}

impl CameraConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            z_near: 0.1,
            z_far: 1000.0,
            fov_degrees: 90.0,
            viewport_width: width as f64,
            viewport_height: height as f64,
            ortho_half_extent: 2.0,
        }
    }

    /// Viewport width over height
    pub fn aspect(&self) -> f64 {
        self.viewport_width / self.viewport_height
    }

    pub fn projection_matrix(&self, display: DisplayType) -> Matrix {
        match display {
            DisplayType::Perspective => self.perspective_matrix(),
            DisplayType::Orthographic => self.orthographic_matrix(),
        }
    }

    /// Row-vector perspective matrix; the output W equals camera-space z
    pub fn perspective_matrix(&self) -> Matrix {
        let a = self.aspect();
        let f = 1.0 / (self.fov_degrees.to_radians() / 2.0).tan();
        let q = self.z_far / (self.z_far - self.z_near);
        Matrix::from_rows(&[
            [f / a, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, q, 1.0],
            [0.0, 0.0, -self.z_near * q, 0.0],
        ])
    }

    /// Drops z and keeps W = 1; x is corrected for aspect only
    pub fn orthographic_matrix(&self) -> Matrix {
        Matrix::from_rows(&[
            [1.0 / self.aspect(), 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Map a projected vertex to pixel coordinates.
    ///
    /// x and y are negated, offset into a positive range and scaled to the
    /// viewport. Perspective output spans [-1, 1]; orthographic output spans
    /// [-ortho_half_extent, ortho_half_extent].
    pub fn to_screen(&self, v: Vector3D, display: DisplayType) -> Vector3D {
        let extent = match display {
            DisplayType::Perspective => 1.0,
            DisplayType::Orthographic => self.ortho_half_extent,
        };
        let scale_x = 0.5 * self.viewport_width / extent;
        let scale_y = 0.5 * self.viewport_height / extent;
        Vector3D::with_w((extent - v.x) * scale_x, (extent - v.y) * scale_y, v.z, v.w)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Divide x, y and z by W.
///
/// Returns the vertex unchanged and `false` when |W| < `W_EPSILON`.
pub fn perspective_divide(v: Vector3D) -> (Vector3D, bool) {
    if v.w.abs() < W_EPSILON {
        return (v, false);
    }
    (Vector3D::with_w(v.x / v.w, v.y / v.w, v.z / v.w, v.w), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx_eq;

    #[test]
    fn test_camera_config_creation() {
        let config = CameraConfig::new(800, 600);
        assert!(approx_eq(config.aspect(), 800.0 / 600.0));
        assert_eq!(config, CameraConfig::default());
    }

    #[test]
    fn test_perspective_w_is_depth() {
        let config = CameraConfig::new(2, 2);
        let p = Vector3D::new(0.5, -0.5, 4.0)
            .transform(&config.perspective_matrix())
            .unwrap();
        assert!(approx_eq(p.w, 4.0));
        // fov 90 gives F = 1 and a square viewport gives A = 1
        assert!(approx_eq(p.x, 0.5));
        assert!(approx_eq(p.y, -0.5));
    }

    #[test]
    fn test_perspective_depth_range() {
        let config = CameraConfig::new(4, 3);
        let m = config.perspective_matrix();
        let near = Vector3D::new(0.0, 0.0, config.z_near).transform(&m).unwrap();
        let far = Vector3D::new(0.0, 0.0, config.z_far).transform(&m).unwrap();
        assert!(approx_eq(perspective_divide(near).0.z, 0.0));
        assert!(approx_eq(perspective_divide(far).0.z, 1.0));
    }

    #[test]
    fn test_orthographic_keeps_unit_w() {
        let config = CameraConfig::new(200, 100);
        let p = Vector3D::new(2.0, 1.0, 50.0)
            .transform(&config.orthographic_matrix())
            .unwrap();
        assert!(p.approx_eq_homogeneous(&Vector3D::with_w(1.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_divide_skipped_near_zero_w() {
        let v = Vector3D::with_w(1.0, 2.0, 3.0, 0.004);
        let (out, divided) = perspective_divide(v);
        assert!(!divided);
        assert!(out.approx_eq_homogeneous(&v));

        let (out, divided) = perspective_divide(Vector3D::with_w(1.0, 2.0, 3.0, 0.005));
        assert!(divided);
        assert!(approx_eq(out.x, 200.0));
    }

    #[test]
    fn test_to_screen_centre_and_corners() {
        let config = CameraConfig::new(200, 100);
        let centre = config.to_screen(Vector3D::ZERO, DisplayType::Perspective);
        assert!(approx_eq(centre.x, 100.0) && approx_eq(centre.y, 50.0));

        // +x/+y in clip space land on the left/top edge after negation
        let corner = config.to_screen(Vector3D::new(1.0, 1.0, 0.0), DisplayType::Perspective);
        assert!(approx_eq(corner.x, 0.0) && approx_eq(corner.y, 0.0));

        let ortho = config.to_screen(Vector3D::new(-2.0, -2.0, 0.0), DisplayType::Orthographic);
        assert!(approx_eq(ortho.x, 200.0) && approx_eq(ortho.y, 100.0));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: CameraConfig =
            serde_json::from_str(r#"{"fov_degrees": 60.0, "viewport_width": 320.0}"#).unwrap();
        assert_eq!(config.fov_degrees, 60.0);
        assert_eq!(config.viewport_width, 320.0);
        assert_eq!(config.viewport_height, 600.0);
    }
}
