/// Five-stage per-frame transform from model space to screen space
use std::fmt;

use log::{debug, trace, warn};

use crate::error::Result;
use crate::geometry::PolyTriangle;
use crate::matrix::Matrix;
use crate::projection::{perspective_divide, CameraConfig, DisplayType};
use crate::transform::Transform;

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    World,
    Camera,
    Cull,
    Project,
    Viewport,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::World => "world",
            Stage::Camera => "camera",
            Stage::Cull => "cull",
            Stage::Project => "project",
            Stage::Viewport => "viewport",
        };
        f.write_str(name)
    }
}

/// Receives the triangle list after every stage; diagnostics only
pub trait StageSink {
    fn record(&mut self, stage: Stage, triangles: &[PolyTriangle]);
}

/// Dumps every stage through `log` at trace level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StageSink for LogSink {
    fn record(&mut self, stage: Stage, triangles: &[PolyTriangle]) {
        trace!("after {} stage: {} triangles", stage, triangles.len());
        for (i, tri) in triangles.iter().enumerate() {
            let vertices: Vec<String> = tri.vertices().iter().map(|v| v.to_string()).collect();
            trace!("  [{}] {}", i, vertices.join(" "));
        }
    }
}

/// Keeps a copy of every stage's output
impl StageSink for Vec<(Stage, Vec<PolyTriangle>)> {
    fn record(&mut self, stage: Stage, triangles: &[PolyTriangle]) {
        self.push((stage, triangles.to_vec()));
    }
}

/// Multiply every vertex by the model matrix
pub fn world_stage(triangles: &[PolyTriangle], model: &Matrix) -> Result<Vec<PolyTriangle>> {
    triangles.iter().map(|t| t.transform(model)).collect()
}

/// Multiply every vertex by the view matrix
pub fn camera_stage(triangles: &[PolyTriangle], view: &Matrix) -> Result<Vec<PolyTriangle>> {
    triangles.iter().map(|t| t.transform(view)).collect()
}

/// Keep triangles whose camera-space shoelace sum is negative
pub fn cull_stage(triangles: &[PolyTriangle]) -> Vec<PolyTriangle> {
    triangles
        .iter()
        .filter(|t| t.signed_area_xy() < 0.0)
        .cloned()
        .collect()
}

/// Apply the projection matrix; perspective output is divided by W
pub fn project_stage(
    triangles: &[PolyTriangle],
    projection: &Matrix,
    display: DisplayType,
) -> Result<Vec<PolyTriangle>> {
    let mut skipped = 0usize;
    let projected = triangles
        .iter()
        .map(|t| -> Result<PolyTriangle> {
            let clip = t.transform(projection)?;
            if display == DisplayType::Orthographic {
                return Ok(clip);
            }
            Ok(clip.map_vertices(|v| {
                let (out, divided) = perspective_divide(*v);
                if !divided {
                    skipped += 1;
                }
                out
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    if skipped > 0 {
        warn!("Skipped perspective divide for {} vertices with W near zero", skipped);
    }
    Ok(projected)
}

/// Map projected triangles onto the viewport
pub fn viewport_stage(
    triangles: &[PolyTriangle],
    config: &CameraConfig,
    display: DisplayType,
) -> Vec<PolyTriangle> {
    triangles
        .iter()
        .map(|t| t.map_vertices(|v| config.to_screen(*v, display)))
        .collect()
}

/// One frame's worth of configuration for the five stages.
///
/// Borrows its inputs read-only, so any number of pipelines may run at once
/// on separate threads over the same configuration.
pub struct Pipeline<'a> {
    transform: &'a Transform,
    config: &'a CameraConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(transform: &'a Transform, config: &'a CameraConfig) -> Self {
        Self { transform, config }
    }

    /// Transform model-space triangles to screen space
    pub fn run(&self, triangles: &[PolyTriangle]) -> Result<Vec<PolyTriangle>> {
        self.execute(triangles, None)
    }

    /// Like `run`, also handing each stage's output to `sink`
    pub fn run_with_sink(
        &self,
        triangles: &[PolyTriangle],
        sink: &mut dyn StageSink,
    ) -> Result<Vec<PolyTriangle>> {
        self.execute(triangles, Some(sink))
    }

    fn execute(
        &self,
        triangles: &[PolyTriangle],
        mut sink: Option<&mut dyn StageSink>,
    ) -> Result<Vec<PolyTriangle>> {
        let display = self.transform.display_type;
        debug!(
            "Running pipeline on {} triangles ({:?}, {:?})",
            triangles.len(),
            self.transform.camera_type,
            display
        );

        let mut emit = |stage: Stage, tris: &[PolyTriangle]| {
            if let Some(sink) = sink.as_deref_mut() {
                sink.record(stage, tris);
            }
        };

        let world = world_stage(triangles, &self.transform.model_matrix()?)?;
        emit(Stage::World, &world);

        let camera = camera_stage(&world, &self.transform.view_matrix()?)?;
        emit(Stage::Camera, &camera);

        let visible = cull_stage(&camera);
        emit(Stage::Cull, &visible);
        debug!("Culled {} of {} triangles", camera.len() - visible.len(), camera.len());

        let projected = project_stage(&visible, &self.config.projection_matrix(display), display)?;
        emit(Stage::Project, &projected);

        let screen = viewport_stage(&projected, self.config, display);
        emit(Stage::Viewport, &screen);

        Ok(screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx_eq;
    use crate::geometry::Mesh;
    use crate::transform::CameraType;
    use crate::vector::Vector3D;

    fn tri(a: (f64, f64, f64), b: (f64, f64, f64), c: (f64, f64, f64)) -> PolyTriangle {
        PolyTriangle::triangle(
            Vector3D::new(a.0, a.1, a.2),
            Vector3D::new(b.0, b.1, b.2),
            Vector3D::new(c.0, c.1, c.2),
        )
    }

    fn cube_from_front() -> Transform {
        Transform {
            position: Vector3D::new(0.0, 0.0, -5.0),
            ..Transform::default()
        }
    }

    #[test_log::test]
    fn test_cull_uses_shoelace_sign() {
        let positive = tri((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0));
        let negative = tri((0.0, 0.0, 0.0), (0.0, 1.0, 0.0), (1.0, 1.0, 0.0));
        let degenerate = tri((0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (2.0, 2.0, 0.0));
        let kept = cull_stage(&[positive, negative.clone(), degenerate]);
        assert_eq!(kept, vec![negative]);
    }

    #[test_log::test]
    fn test_point_in_front_maps_to_viewport_centre() {
        let transform = Transform::default();
        let config = CameraConfig {
            fov_degrees: 90.0,
            z_near: 0.1,
            ..CameraConfig::new(2, 2)
        };
        let input = tri((0.0, 0.0, 1.0), (0.0, 1.0, 1.0), (1.0, 1.0, 1.0));
        let out = Pipeline::new(&transform, &config).run(&[input]).unwrap();
        assert_eq!(out.len(), 1);
        let centre = out[0][0];
        assert!(approx_eq(centre.x, 1.0) && approx_eq(centre.y, 1.0));
        // Depth and W survive in perspective mode
        assert!(approx_eq(centre.w, 1.0));
    }

    #[test_log::test]
    fn test_cube_front_face_only() {
        let transform = cube_from_front();
        let config = CameraConfig::new(80, 40);
        let cube = Mesh::cube(2.0);
        let out = Pipeline::new(&transform, &config).run(&cube.triangles).unwrap();
        assert_eq!(out.len(), 2);
        for v in out.iter().flat_map(|t| t.vertices()) {
            assert!(v.x >= 35.0 - 1e-9 && v.x <= 45.0 + 1e-9, "x = {}", v.x);
            assert!(v.y >= 15.0 - 1e-9 && v.y <= 25.0 + 1e-9, "y = {}", v.y);
            assert!(approx_eq(v.w, 4.0));
        }
    }

    #[test_log::test]
    fn test_point_at_sees_back_face() {
        let transform = Transform {
            camera_type: CameraType::PointAt,
            position: Vector3D::new(0.0, 0.0, 5.0),
            target: Vector3D::ZERO,
            ..Transform::default()
        };
        let config = CameraConfig::new(80, 40);
        let cube = Mesh::cube(2.0);
        let mut stages: Vec<(Stage, Vec<PolyTriangle>)> = Vec::new();
        let out = Pipeline::new(&transform, &config)
            .run_with_sink(&cube.triangles, &mut stages)
            .unwrap();
        assert_eq!(out.len(), 2);

        let culled = &stages[2].1;
        for t in culled {
            // Camera-space z of the +z face seen from z = 5
            assert!(t.vertices().iter().all(|v| approx_eq(v.z, 4.0)));
        }
    }

    #[test_log::test]
    fn test_sink_sees_every_stage_in_order() {
        let transform = cube_from_front();
        let config = CameraConfig::default();
        let cube = Mesh::cube(1.0);
        let mut stages: Vec<(Stage, Vec<PolyTriangle>)> = Vec::new();
        let out = Pipeline::new(&transform, &config)
            .run_with_sink(&cube.triangles, &mut stages)
            .unwrap();

        let order: Vec<Stage> = stages.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            order,
            vec![Stage::World, Stage::Camera, Stage::Cull, Stage::Project, Stage::Viewport]
        );
        assert_eq!(stages[0].1.len(), 12);
        assert_eq!(stages[2].1.len(), 2);
        assert_eq!(stages[4].1, out);

        let mut log_sink = LogSink;
        Pipeline::new(&transform, &config)
            .run_with_sink(&cube.triangles, &mut log_sink)
            .unwrap();
    }

    #[test_log::test]
    fn test_orthographic_centres_cube() {
        let transform = Transform {
            display_type: DisplayType::Orthographic,
            ..cube_from_front()
        };
        let config = CameraConfig::new(100, 100);
        let out = Pipeline::new(&transform, &config)
            .run(&Mesh::cube(2.0).triangles)
            .unwrap();
        assert_eq!(out.len(), 2);
        for v in out.iter().flat_map(|t| t.vertices()) {
            // Half extent 2 on a 100px viewport: +-1 maps to 25 / 75
            assert!(approx_eq(v.x, 25.0) || approx_eq(v.x, 75.0));
            assert!(approx_eq(v.y, 25.0) || approx_eq(v.y, 75.0));
            assert!(approx_eq(v.z, 0.0) && approx_eq(v.w, 1.0));
        }
    }

    #[test_log::test]
    fn test_near_zero_w_is_not_divided() {
        let projection = Matrix::identity(4);
        let mut t = tri((1.0, 1.0, 1.0), (2.0, 2.0, 2.0), (3.0, 3.0, 3.0));
        t.set(0, Vector3D::with_w(1.0, 1.0, 1.0, 0.001)).unwrap();
        let out = project_stage(&[t], &projection, DisplayType::Perspective).unwrap();
        assert!(out[0][0].approx_eq_homogeneous(&Vector3D::with_w(1.0, 1.0, 1.0, 0.001)));
    }

    #[test]
    fn test_concurrent_runs_share_config() {
        let config = CameraConfig::new(64, 48);
        let cube = Mesh::cube(2.0);
        let front = cube_from_front();
        let rotated = Transform {
            rotation: Vector3D::new(15.0, 30.0, 0.0),
            ..cube_from_front()
        };
        let expected_front = Pipeline::new(&front, &config).run(&cube.triangles).unwrap();
        let expected_rotated = Pipeline::new(&rotated, &config).run(&cube.triangles).unwrap();

        std::thread::scope(|s| {
            let a = s.spawn(|| Pipeline::new(&front, &config).run(&cube.triangles).unwrap());
            let b = s.spawn(|| Pipeline::new(&rotated, &config).run(&cube.triangles).unwrap());
            assert_eq!(a.join().unwrap(), expected_front);
            assert_eq!(b.join().unwrap(), expected_rotated);
        });
    }
}
