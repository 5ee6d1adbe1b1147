/// Integer line rasterization (Bresenham) for pixel-grid writers
use crate::geometry::PolyTriangle;
use crate::vector::Vector3D;

/// Integer pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate2D {
    pub x: i32,
    pub y: i32,
}

impl Coordinate2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Row-major index into a grid `grid_width` cells wide
    pub fn linear_id(&self, grid_width: i32) -> i64 {
        self.y as i64 * grid_width as i64 + self.x as i64
    }

    /// Nearest lattice point to a screen-space vertex.
    ///
    /// The float-to-int cast saturates: NaN becomes 0 and out-of-range
    /// values clamp to the i32 limits. Check `is_finite` first when the
    /// vertex may be degenerate.
    pub fn from_screen(v: &Vector3D) -> Self {
        Self::new(v.x.round() as i32, v.y.round() as i32)
    }
}

/// Integer voxel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinate3D {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Every lattice point from `start` to `end`, both included once.
///
/// Walks the dominant axis (`|dx| >= |dy|` picks x) one unit per step and
/// steps the other axis whenever the error term turns positive.
pub fn line_2d(start: Coordinate2D, end: Coordinate2D) -> Vec<Coordinate2D> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let (adx, ady) = (dx.abs(), dy.abs());
    let (sx, sy) = (dx.signum(), dy.signum());

    let mut points = Vec::with_capacity(adx.max(ady) as usize + 1);
    let (mut x, mut y) = (start.x, start.y);

    if adx >= ady {
        let mut err = 2 * ady - adx;
        for _ in 0..=adx {
            points.push(Coordinate2D::new(x, y));
            if err > 0 {
                y += sy;
                err -= 2 * adx;
            }
            err += 2 * ady;
            x += sx;
        }
    } else {
        let mut err = 2 * adx - ady;
        for _ in 0..=ady {
            points.push(Coordinate2D::new(x, y));
            if err > 0 {
                x += sx;
                err -= 2 * ady;
            }
            err += 2 * adx;
            y += sy;
        }
    }
    points
}

/// 3D Bresenham.
///
/// The dominant axis is the one with the largest absolute delta (ties go
/// to x, then y). Each of the other two axes keeps its own error term
/// measured against the dominant step count.
pub fn line_3d(start: Coordinate3D, end: Coordinate3D) -> Vec<Coordinate3D> {
    let from = [start.x, start.y, start.z];
    let delta = [end.x - start.x, end.y - start.y, end.z - start.z];
    let abs = delta.map(i32::abs);
    let step = delta.map(i32::signum);

    let dominant = if abs[0] >= abs[1] && abs[0] >= abs[2] {
        0
    } else if abs[1] >= abs[2] {
        1
    } else {
        2
    };
    let (a, b) = match dominant {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };

    let steps = abs[dominant];
    let mut err_a = 2 * abs[a] - steps;
    let mut err_b = 2 * abs[b] - steps;
    let mut p = from;
    let mut points = Vec::with_capacity(steps as usize + 1);

    for _ in 0..=steps {
        points.push(Coordinate3D::new(p[0], p[1], p[2]));
        if err_a > 0 {
            p[a] += step[a];
            err_a -= 2 * steps;
        }
        if err_b > 0 {
            p[b] += step[b];
            err_b -= 2 * steps;
        }
        err_a += 2 * abs[a];
        err_b += 2 * abs[b];
        p[dominant] += step[dominant];
    }
    points
}

/// Closed outline of a screen-space polygon.
///
/// Each shared corner appears once; a polygon whose corners all round to
/// one pixel yields that single pixel. Polygons with a non-finite vertex
/// yield no points.
pub fn triangle_outline(triangle: &PolyTriangle) -> Vec<Coordinate2D> {
    let vertices = triangle.vertices();
    if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
        return Vec::new();
    }
    let corners: Vec<Coordinate2D> = vertices.iter().map(Coordinate2D::from_screen).collect();
    let n = corners.len();
    let mut points = Vec::new();
    for i in 0..n {
        let mut edge = line_2d(corners[i], corners[(i + 1) % n]);
        // The next edge starts where this one ends
        edge.pop();
        points.extend(edge);
    }
    if points.is_empty() {
        points.push(corners[0]);
    }
    points
}
