/// pipe3d Core Library - 3D to 2D geometry transformation pipeline
///
/// This library provides the stateless core: vector and matrix algebra,
/// LU-based inversion, orbit and look-at cameras, projection, backface
/// culling and Bresenham line rasterization.

pub mod error;
pub mod geometry;
pub mod matrix;
pub mod pipeline;
pub mod projection;
pub mod raster;
pub mod transform;
pub mod vector;

// Re-export commonly used types
pub use error::{Error, Result};
pub use geometry::{create_tri, Mesh, PolyTriangle};
pub use matrix::{LuDecomposition, Matrix};
pub use pipeline::{LogSink, Pipeline, Stage, StageSink};
pub use projection::{CameraConfig, DisplayType};
pub use raster::{line_2d, line_3d, Coordinate2D, Coordinate3D};
pub use transform::{CameraCommand, CameraType, Transform};
pub use vector::{Vector2D, Vector3D};

/// Absolute tolerance for every floating-point equality in the crate
pub const EPSILON: f64 = 1e-6;

/// `|a - b| < EPSILON`
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}
