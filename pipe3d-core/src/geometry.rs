/// Geometry primitives for the transformation pipeline
use std::ops::Index;

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::vector::Vector3D;

/// An ordered polygon of three or more vertices.
///
/// The pipeline works on triangles, but every operation here accepts any
/// vertex count so polygons can flow through the same stages.
#[derive(Debug, Clone)]
pub struct PolyTriangle {
    vertices: Vec<Vector3D>,
}

impl PolyTriangle {
    pub fn new(vertices: Vec<Vector3D>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::TooFewVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    pub fn triangle(v0: Vector3D, v1: Vector3D, v2: Vector3D) -> Self {
        Self {
            vertices: vec![v0, v1, v2],
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Never true for a constructed polygon
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vector3D] {
        &self.vertices
    }

    pub fn get(&self, index: usize) -> Option<Vector3D> {
        self.vertices.get(index).copied()
    }

    pub fn set(&mut self, index: usize, vertex: Vector3D) -> Result<()> {
        let len = self.vertices.len();
        let slot = self
            .vertices
            .get_mut(index)
            .ok_or(Error::VertexIndex { index, len })?;
        *slot = vertex;
        Ok(())
    }

    /// Face normal from the first two edges.
    ///
    /// Degenerate (collinear) vertices yield NaN components.
    pub fn normal(&self) -> Vector3D {
        let v0 = self.vertices[0];
        let edge1 = self.vertices[1] - v0;
        let edge2 = self.vertices[2] - v0;
        edge1.cross(edge2).normalize()
    }

    /// Shoelace sum `Σ (x_i·y_{i+1} − y_i·x_{i+1})` over the x/y projection.
    ///
    /// This is twice the signed area; negative means clockwise with y up.
    pub fn signed_area_xy(&self) -> f64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x * b.y - a.y * b.x
            })
            .sum()
    }

    /// New polygon with `f` applied to every vertex
    pub fn map_vertices(&self, f: impl FnMut(&Vector3D) -> Vector3D) -> Self {
        Self {
            vertices: self.vertices.iter().map(f).collect(),
        }
    }

    /// New polygon with every vertex multiplied by a 4x4 matrix
    pub fn transform(&self, m: &Matrix) -> Result<Self> {
        let vertices = self
            .vertices
            .iter()
            .map(|v| v.transform(m))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { vertices })
    }
}

impl Index<usize> for PolyTriangle {
    type Output = Vector3D;

    fn index(&self, index: usize) -> &Vector3D {
        &self.vertices[index]
    }
}

impl PartialEq for PolyTriangle {
    fn eq(&self, other: &Self) -> bool {
        self.vertices.len() == other.vertices.len()
            && self
                .vertices
                .iter()
                .zip(&other.vertices)
                .all(|(a, b)| a.approx_eq(b))
    }
}

/// Batch a flat vertex stream into consecutive triangles.
///
/// Each triple must already be wound clockwise (negative shoelace sum when
/// facing the camera).
pub fn create_tri(stream: &[Vector3D]) -> Result<Vec<PolyTriangle>> {
    if stream.len() % 3 != 0 {
        return Err(Error::VertexStream(stream.len()));
    }
    Ok(stream
        .chunks_exact(3)
        .map(|c| PolyTriangle::triangle(c[0], c[1], c[2]))
        .collect())
}

/// A list of triangles fed to the pipeline as one unit
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<PolyTriangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: PolyTriangle) {
        self.triangles.push(triangle);
    }

    pub fn from_vertex_stream(stream: &[Vector3D]) -> Result<Self> {
        Ok(Self {
            triangles: create_tri(stream)?,
        })
    }

    /// Axis-aligned cube centred on the origin.
    ///
    /// Every face is wound clockwise when seen from outside through the
    /// camera's left-handed frame (x right, y up, z forward), so the culling
    /// stage keeps exactly the faces pointing at the camera.
    pub fn cube(size: f64) -> Self {
        let h = size / 2.0;
        let v = Vector3D::new;
        let stream = [
            // Front (-z)
            v(-h, -h, -h), v(-h, h, -h), v(h, h, -h),
            v(-h, -h, -h), v(h, h, -h), v(h, -h, -h),
            // Back (+z)
            v(-h, -h, h), v(h, -h, h), v(h, h, h),
            v(-h, -h, h), v(h, h, h), v(-h, h, h),
            // Top (+y)
            v(-h, h, -h), v(-h, h, h), v(h, h, h),
            v(-h, h, -h), v(h, h, h), v(h, h, -h),
            // Bottom (-y)
            v(-h, -h, -h), v(h, -h, -h), v(h, -h, h),
            v(-h, -h, -h), v(h, -h, h), v(-h, -h, h),
            // Right (+x)
            v(h, -h, -h), v(h, h, -h), v(h, h, h),
            v(h, -h, -h), v(h, h, h), v(h, -h, h),
            // Left (-x)
            v(-h, -h, -h), v(-h, -h, h), v(-h, h, h),
            v(-h, -h, -h), v(-h, h, h), v(-h, h, -h),
        ];
        let mut mesh = Self::with_capacity(stream.len() / 3);
        for tri in stream.chunks_exact(3) {
            mesh.add_triangle(PolyTriangle::triangle(tri[0], tri[1], tri[2]));
        }
        mesh
    }
}
