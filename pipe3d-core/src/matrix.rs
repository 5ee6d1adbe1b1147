/// Rectangular matrices and LU-based linear algebra
use std::fmt;
use std::ops::{Index, IndexMut};

use nalgebra::DMatrix;

use crate::approx_eq;
use crate::error::{Error, Result};

/// A dense `height x width` matrix of `f64` stored row-major.
///
/// Binary operations check shapes and return `Error::DimensionMismatch`
/// instead of panicking. `Index` panics on out-of-range access; use `get` /
/// `set` for the fallible form.
#[derive(Debug, Clone)]
pub struct Matrix {
    height: usize,
    width: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![0.0; height * width],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Build from fixed-width rows
    pub fn from_rows<const N: usize>(rows: &[[f64; N]]) -> Self {
        Self {
            height: rows.len(),
            width: N,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn from_vec(height: usize, width: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != height * width {
            return Err(Error::BufferSize {
                expected: height * width,
                actual: data.len(),
            });
        }
        Ok(Self { height, width, data })
    }

    pub fn from_row_slice(height: usize, width: usize, data: &[f64]) -> Result<Self> {
        Self::from_vec(height, width, data.to_vec())
    }

    /// 1 x n matrix holding `values`
    pub fn row_vector(values: &[f64]) -> Self {
        Self {
            height: 1,
            width: values.len(),
            data: values.to_vec(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_square(&self) -> bool {
        self.height == self.width
    }

    /// Row-major backing store
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<usize> {
        if row < self.height && col < self.width {
            Ok(row * self.width + col)
        } else {
            Err(Error::IndexOutOfBounds {
                row,
                col,
                height: self.height,
                width: self.width,
            })
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_bounds(row, col).map(|i| self.data[i])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let i = self.check_bounds(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    /// Element access without bounds checks.
    ///
    /// # Safety
    /// `row < self.height()` and `col < self.width()` must hold.
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> f64 {
        *self.data.get_unchecked(row * self.width + col)
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        (row < self.height).then(|| &self.data[row * self.width..(row + 1) * self.width])
    }

    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        (col < self.width).then(|| {
            (0..self.height)
                .map(|r| self.data[r * self.width + col])
                .collect()
        })
    }

    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.width, self.height);
        for r in 0..self.height {
            for c in 0..self.width {
                t.data[c * self.height + r] = self.data[r * self.width + c];
            }
        }
        t
    }

    pub fn scale(&self, s: f64) -> Matrix {
        Matrix {
            height: self.height,
            width: self.width,
            data: self.data.iter().map(|v| v * s).collect(),
        }
    }

    fn mismatch(&self, other: &Matrix, operation: &'static str) -> Error {
        Error::DimensionMismatch {
            operation,
            left_height: self.height,
            left_width: self.width,
            right_height: other.height,
            right_width: other.width,
        }
    }

    /// Matrix product `self · other`
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.width != other.height {
            return Err(self.mismatch(other, "multiply"));
        }
        let mut out = Matrix::zeros(self.height, other.width);
        for r in 0..self.height {
            let lhs = &self.data[r * self.width..(r + 1) * self.width];
            for c in 0..other.width {
                out.data[r * other.width + c] = lhs
                    .iter()
                    .enumerate()
                    .map(|(k, a)| a * other.data[k * other.width + c])
                    .sum();
            }
        }
        Ok(out)
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    fn zip_with(
        &self,
        other: &Matrix,
        operation: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Matrix> {
        if self.height != other.height || self.width != other.width {
            return Err(self.mismatch(other, operation));
        }
        Ok(Matrix {
            height: self.height,
            width: self.width,
            data: self.data.iter().zip(&other.data).map(|(a, b)| f(*a, *b)).collect(),
        })
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.width {
            self.data.swap(a * self.width + c, b * self.width + c);
        }
    }

    /// Same shape and every element within `EPSILON`
    pub fn approx_eq(&self, other: &Matrix) -> bool {
        self.height == other.height
            && self.width == other.width
            && self.data.iter().zip(&other.data).all(|(a, b)| approx_eq(*a, *b))
    }

    fn require_square(&self) -> Result<usize> {
        if self.is_square() {
            Ok(self.height)
        } else {
            Err(Error::NotSquare {
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Doolittle LU decomposition with partial pivoting.
    ///
    /// Produces `P·A = L·U` with a unit lower triangle. Fails with
    /// `Singular` when a leading column has no nonzero candidate pivot.
    pub fn decompose(&self) -> Result<LuDecomposition> {
        let n = self.require_square()?;
        let mut lu = self.clone();
        let mut permutation: Vec<usize> = (0..n).collect();
        let mut toggle = 1.0;

        for j in 0..n.saturating_sub(1) {
            let mut pivot_row = j;
            let mut max = lu[(j, j)].abs();
            for i in j + 1..n {
                let candidate = lu[(i, j)].abs();
                if candidate > max {
                    max = candidate;
                    pivot_row = i;
                }
            }
            if pivot_row != j {
                lu.swap_rows(pivot_row, j);
                permutation.swap(pivot_row, j);
                toggle = -toggle;
            }

            if lu[(j, j)] == 0.0 {
                let row = (j + 1..n)
                    .find(|&i| lu[(i, j)] != 0.0)
                    .ok_or(Error::Singular { column: j })?;
                lu.swap_rows(row, j);
                permutation.swap(row, j);
                toggle = -toggle;
            }

            let pivot = lu[(j, j)];
            for i in j + 1..n {
                let factor = lu[(i, j)] / pivot;
                lu[(i, j)] = factor;
                for k in j + 1..n {
                    let upper = lu[(j, k)];
                    lu[(i, k)] -= factor * upper;
                }
            }
        }

        Ok(LuDecomposition {
            lu,
            permutation,
            toggle,
        })
    }

    /// Determinant via LU.
    ///
    /// A leading column with no pivot is reported as `Singular`, not as 0.
    pub fn determinant(&self) -> Result<f64> {
        Ok(self.decompose()?.determinant())
    }

    pub fn inverse(&self) -> Result<Matrix> {
        self.decompose()?.inverse()
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.height && col < self.width,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.height,
            self.width
        );
        &self.data[row * self.width + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.height && col < self.width,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.height,
            self.width
        );
        &mut self.data[row * self.width + col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.height {
            write!(f, "[")?;
            for c in 0..self.width {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>10.4}", self.data[r * self.width + c])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

impl From<&Matrix> for DMatrix<f64> {
    fn from(m: &Matrix) -> Self {
        DMatrix::from_row_slice(m.height, m.width, &m.data)
    }
}

impl From<&DMatrix<f64>> for Matrix {
    fn from(m: &DMatrix<f64>) -> Self {
        let (height, width) = m.shape();
        Matrix {
            height,
            width,
            data: (0..height)
                .flat_map(|r| (0..width).map(move |c| m[(r, c)]))
                .collect(),
        }
    }
}

/// Packed result of `Matrix::decompose`.
///
/// The strict lower triangle of `lu` holds L (its unit diagonal is
/// implicit) and the upper triangle holds U. `permutation[i]` is the
/// original row now at position `i`.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: Matrix,
    permutation: Vec<usize>,
    toggle: f64,
}

impl LuDecomposition {
    pub fn packed(&self) -> &Matrix {
        &self.lu
    }

    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// +1 for an even number of row swaps, -1 for odd
    pub fn toggle(&self) -> f64 {
        self.toggle
    }

    pub fn lower(&self) -> Matrix {
        let n = self.lu.height;
        let mut l = Matrix::identity(n);
        for r in 1..n {
            for c in 0..r {
                l[(r, c)] = self.lu[(r, c)];
            }
        }
        l
    }

    pub fn upper(&self) -> Matrix {
        let n = self.lu.height;
        let mut u = Matrix::zeros(n, n);
        for r in 0..n {
            for c in r..n {
                u[(r, c)] = self.lu[(r, c)];
            }
        }
        u
    }

    pub fn determinant(&self) -> f64 {
        let n = self.lu.height;
        (0..n).fold(self.toggle, |acc, i| acc * self.lu[(i, i)])
    }

    /// Solve `A·x = b` for the decomposed `A`
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>> {
        let n = self.lu.height;
        if b.len() != n {
            return Err(Error::DimensionMismatch {
                operation: "solve",
                left_height: n,
                left_width: n,
                right_height: b.len(),
                right_width: 1,
            });
        }

        // Forward substitution on the permuted right-hand side (L has a unit diagonal)
        let mut y: Vec<f64> = self.permutation.iter().map(|&p| b[p]).collect();
        for i in 1..n {
            let sum: f64 = (0..i).map(|k| self.lu[(i, k)] * y[k]).sum();
            y[i] -= sum;
        }

        // Back substitution through U
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let diag = self.lu[(i, i)];
            if diag == 0.0 {
                return Err(Error::Singular { column: i });
            }
            let sum: f64 = (i + 1..n).map(|k| self.lu[(i, k)] * x[k]).sum();
            x[i] = (y[i] - sum) / diag;
        }
        Ok(x)
    }

    /// Inverse assembled column by column from `A·x = e_i`
    pub fn inverse(&self) -> Result<Matrix> {
        let n = self.lu.height;
        let mut inv = Matrix::zeros(n, n);
        let mut basis = vec![0.0; n];
        for i in 0..n {
            basis.iter_mut().for_each(|v| *v = 0.0);
            basis[i] = 1.0;
            let column = self.solve(&basis)?;
            for (r, value) in column.into_iter().enumerate() {
                inv[(r, i)] = value;
            }
        }
        Ok(inv)
    }
}
