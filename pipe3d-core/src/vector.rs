/// 2D and 3D vector algebra
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::{approx_eq, EPSILON};

fn default_w() -> f64 {
    1.0
}

/// A 3D vector with a homogeneous `w` component.
///
/// `w` only carries state through the perspective divide. Arithmetic keeps
/// the left operand's `w` and equality ignores it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default = "default_w", skip_serializing)]
    pub w: f64,
}

impl Vector3D {
    pub const ZERO: Vector3D = Vector3D::new(0.0, 0.0, 0.0);
    pub const UNIT_X: Vector3D = Vector3D::new(1.0, 0.0, 0.0);
    pub const UNIT_Y: Vector3D = Vector3D::new(0.0, 1.0, 0.0);
    pub const UNIT_Z: Vector3D = Vector3D::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub const fn with_w(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn add(self, other: Vector3D) -> Vector3D {
        Vector3D::with_w(self.x + other.x, self.y + other.y, self.z + other.z, self.w)
    }

    pub fn subtract(self, other: Vector3D) -> Vector3D {
        Vector3D::with_w(self.x - other.x, self.y - other.y, self.z - other.z, self.w)
    }

    pub fn negate(self) -> Vector3D {
        Vector3D::with_w(-self.x, -self.y, -self.z, self.w)
    }

    pub fn scale(self, s: f64) -> Vector3D {
        Vector3D::with_w(self.x * s, self.y * s, self.z * s, self.w)
    }

    pub fn divide(self, s: f64) -> Vector3D {
        Vector3D::with_w(self.x / s, self.y / s, self.z / s, self.w)
    }

    pub fn dot(self, other: Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vector3D) -> Vector3D {
        Vector3D::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// A zero-length vector produces NaN components; callers that can see
    /// degenerate geometry must check `magnitude()` first.
    pub fn normalize(self) -> Vector3D {
        self.divide(self.magnitude())
    }

    /// Angle between two vectors in radians
    pub fn angle(self, other: Vector3D) -> f64 {
        let cos = self.dot(other) / (self.magnitude() * other.magnitude());
        cos.clamp(-1.0, 1.0).acos()
    }

    /// Per-component comparison of x, y and z within `EPSILON`
    pub fn approx_eq(&self, other: &Vector3D) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y) && approx_eq(self.z, other.z)
    }

    /// Like `approx_eq` but also compares `w`, for projected vectors
    pub fn approx_eq_homogeneous(&self, other: &Vector3D) -> bool {
        self.approx_eq(other) && (self.w - other.w).abs() < EPSILON
    }

    /// Multiply this homogeneous row vector by a 4x4 matrix (`v · M`)
    pub fn transform(&self, m: &Matrix) -> Result<Vector3D> {
        if m.height() != 4 || m.width() != 4 {
            return Err(Error::DimensionMismatch {
                operation: "vector transform",
                left_height: 1,
                left_width: 4,
                right_height: m.height(),
                right_width: m.width(),
            });
        }
        let v = [self.x, self.y, self.z, self.w];
        let mut out = [0.0; 4];
        for (col, slot) in out.iter_mut().enumerate() {
            *slot = (0..4).map(|row| v[row] * m[(row, col)]).sum();
        }
        Ok(Vector3D::with_w(out[0], out[1], out[2], out[3]))
    }

    /// 1x4 row matrix `[x y z w]`
    pub fn to_row_matrix(&self) -> Matrix {
        Matrix::row_vector(&[self.x, self.y, self.z, self.w])
    }
}

impl Default for Vector3D {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Vector3D {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl fmt::Display for Vector3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4}, w={:.4})", self.x, self.y, self.z, self.w)
    }
}

/// Reads 1x3, 1x4, 3x1 or 4x1 matrices; a missing fourth element means `w = 1`.
impl TryFrom<&Matrix> for Vector3D {
    type Error = Error;

    fn try_from(m: &Matrix) -> Result<Self> {
        let len = match (m.height(), m.width()) {
            (1, n @ (3 | 4)) | (n @ (3 | 4), 1) => n,
            (height, width) => return Err(Error::NotAVector { height, width }),
        };
        let data = m.as_slice();
        let w = if len == 4 { data[3] } else { 1.0 };
        Ok(Vector3D::with_w(data[0], data[1], data[2], w))
    }
}

impl From<Point3<f64>> for Vector3D {
    fn from(p: Point3<f64>) -> Self {
        Vector3D::new(p.x, p.y, p.z)
    }
}

impl From<Vector3<f64>> for Vector3D {
    fn from(v: Vector3<f64>) -> Self {
        Vector3D::new(v.x, v.y, v.z)
    }
}

impl From<Vector3D> for Point3<f64> {
    fn from(v: Vector3D) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3D> for Vector3<f64> {
    fn from(v: Vector3D) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl Add for Vector3D {
    type Output = Vector3D;
    fn add(self, other: Vector3D) -> Vector3D {
        Vector3D::add(self, other)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;
    fn sub(self, other: Vector3D) -> Vector3D {
        self.subtract(other)
    }
}

impl Neg for Vector3D {
    type Output = Vector3D;
    fn neg(self) -> Vector3D {
        self.negate()
    }
}

impl Mul<f64> for Vector3D {
    type Output = Vector3D;
    fn mul(self, s: f64) -> Vector3D {
        self.scale(s)
    }
}

impl Div<f64> for Vector3D {
    type Output = Vector3D;
    fn div(self, s: f64) -> Vector3D {
        self.divide(s)
    }
}

/// 2D vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vector2D) -> Vector2D {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(self, other: Vector2D) -> Vector2D {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn negate(self) -> Vector2D {
        Vector2D::new(-self.x, -self.y)
    }

    pub fn scale(self, s: f64) -> Vector2D {
        Vector2D::new(self.x * s, self.y * s)
    }

    pub fn divide(self, s: f64) -> Vector2D {
        Vector2D::new(self.x / s, self.y / s)
    }

    pub fn dot(self, other: Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product of the two vectors lifted to z = 0
    pub fn cross(self, other: Vector2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector; NaN for the zero vector, as with `Vector3D::normalize`
    pub fn normalize(self) -> Vector2D {
        self.divide(self.magnitude())
    }

    pub fn angle(self, other: Vector2D) -> f64 {
        let cos = self.dot(other) / (self.magnitude() * other.magnitude());
        cos.clamp(-1.0, 1.0).acos()
    }

    pub fn approx_eq(&self, other: &Vector2D) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }
}

impl PartialEq for Vector2D {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl From<Vector3D> for Vector2D {
    fn from(v: Vector3D) -> Self {
        Vector2D::new(v.x, v.y)
    }
}

impl Add for Vector2D {
    type Output = Vector2D;
    fn add(self, other: Vector2D) -> Vector2D {
        Vector2D::add(self, other)
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;
    fn sub(self, other: Vector2D) -> Vector2D {
        self.subtract(other)
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;
    fn neg(self) -> Vector2D {
        self.negate()
    }
}

impl Mul<f64> for Vector2D {
    type Output = Vector2D;
    fn mul(self, s: f64) -> Vector2D {
        self.scale(s)
    }
}

impl Div<f64> for Vector2D {
    type Output = Vector2D;
    fn div(self, s: f64) -> Vector2D {
        self.divide(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_cross_of_self_is_zero() {
        for v in [
            Vector3D::new(1.0, 2.0, 3.0),
            Vector3D::new(-4.5, 0.25, 9.0),
            Vector3D::ZERO,
        ] {
            assert_eq!(v.cross(v), Vector3D::ZERO);
        }
    }

    #[test]
    fn test_cross_follows_right_hand_rule() {
        assert_eq!(Vector3D::UNIT_X.cross(Vector3D::UNIT_Y), Vector3D::UNIT_Z);
        assert_eq!(Vector3D::UNIT_Y.cross(Vector3D::UNIT_Z), Vector3D::UNIT_X);
    }

    #[test]
    fn test_normalize_has_unit_length() {
        for v in [
            Vector3D::new(3.0, 4.0, 0.0),
            Vector3D::new(-1.0, 1e-3, 7.5),
            Vector3D::new(1e6, -2e6, 3e6),
        ] {
            assert!(approx_eq(v.normalize().magnitude(), 1.0));
        }
    }

    #[test]
    fn test_normalize_zero_is_nan() {
        let n = Vector3D::ZERO.normalize();
        assert!(n.x.is_nan() && n.y.is_nan() && n.z.is_nan());
    }

    #[test]
    fn test_angle_between() {
        assert!(approx_eq(Vector3D::UNIT_X.angle(Vector3D::UNIT_Y), FRAC_PI_2));
        // Nearly parallel vectors must not produce NaN from acos(1 + tiny)
        let a = Vector3D::new(1.0, 1.0, 1.0);
        assert!(approx_eq(a.angle(a * 3.0), 0.0));
        let back = Vector2D::new(1.0, 0.0).angle(Vector2D::new(-2.0, 0.0));
        assert!(approx_eq(back, std::f64::consts::PI));
    }

    #[test]
    fn test_equality_ignores_w() {
        let a = Vector3D::with_w(1.0, 2.0, 3.0, 1.0);
        let b = Vector3D::with_w(1.0, 2.0, 3.0 + 1e-7, 5.0);
        assert_eq!(a, b);
        assert!(!a.approx_eq_homogeneous(&b));
        assert_ne!(a, Vector3D::new(1.0, 2.0, 3.001));
    }

    #[test]
    fn test_arithmetic_keeps_left_w() {
        let a = Vector3D::with_w(1.0, 1.0, 1.0, 2.0);
        let sum = a + Vector3D::new(1.0, 2.0, 3.0);
        assert_eq!(sum, Vector3D::new(2.0, 3.0, 4.0));
        assert_eq!(sum.w, 2.0);
        assert_eq!(-a, Vector3D::new(-1.0, -1.0, -1.0));
        assert_eq!(a / 2.0, Vector3D::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_transform_by_translation_row() {
        let m = Matrix::from_rows(&[
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [5.0, -1.0, 2.0, 1.0],
        ]);
        let v = Vector3D::new(1.0, 1.0, 1.0).transform(&m).unwrap();
        assert!(v.approx_eq_homogeneous(&Vector3D::with_w(6.0, 0.0, 3.0, 1.0)));
    }

    #[test]
    fn test_transform_rejects_wrong_shape() {
        let err = Vector3D::ZERO.transform(&Matrix::identity(3)).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { right_height: 3, .. }));
    }

    #[test]
    fn test_matrix_conversions() {
        let v = Vector3D::with_w(1.0, 2.0, 3.0, 0.5);
        let back = Vector3D::try_from(&v.to_row_matrix()).unwrap();
        assert!(back.approx_eq_homogeneous(&v));

        let column = Matrix::from_row_slice(3, 1, &[4.0, 5.0, 6.0]).unwrap();
        let c = Vector3D::try_from(&column).unwrap();
        assert!(c.approx_eq_homogeneous(&Vector3D::new(4.0, 5.0, 6.0)));

        let err = Vector3D::try_from(&Matrix::identity(2)).unwrap_err();
        assert_eq!(err, Error::NotAVector { height: 2, width: 2 });
    }

    #[test]
    fn test_nalgebra_interop() {
        let p: Point3<f64> = Vector3D::new(1.0, -2.0, 3.0).into();
        assert_eq!(p, Point3::new(1.0, -2.0, 3.0));
        assert_eq!(Vector3D::from(Vector3::new(0.5, 0.5, 0.5)), Vector3D::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_vector2d_ops() {
        let a = Vector2D::new(3.0, 4.0);
        assert!(approx_eq(a.magnitude(), 5.0));
        assert!(approx_eq(a.cross(Vector2D::new(1.0, 0.0)), -4.0));
        assert_eq!(a - a, Vector2D::ZERO);
        assert!(approx_eq(a.normalize().magnitude(), 1.0));
    }

    #[test]
    fn test_vector2d_drops_depth() {
        let mut v = Vector3D::new(1.5, -2.0, 7.0);
        v.w = 0.25;
        assert_eq!(Vector2D::from(v), Vector2D::new(1.5, -2.0));
    }

    #[test]
    fn test_serde_defaults_w() {
        let v: Vector3D = serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "z": 3.0}"#).unwrap();
        assert_eq!(v.w, 1.0);
    }
}
