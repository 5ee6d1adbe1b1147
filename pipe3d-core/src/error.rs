/// Error types for pipe3d-core
use thiserror::Error;

/// Result type for pipe3d operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the algebra, geometry and pipeline modules.
///
/// Every variant describes a programming or data error; there is no I/O in
/// the core, so nothing here is retryable.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Operand shapes are incompatible for the requested operation
    #[error(
        "Dimension mismatch in {operation}: \
         {left_height}x{left_width} vs {right_height}x{right_width}"
    )]
    DimensionMismatch {
        operation: &'static str,
        left_height: usize,
        left_width: usize,
        right_height: usize,
        right_width: usize,
    },

    /// Determinant, inverse and decomposition need a square matrix
    #[error("Matrix is not square: {height}x{width}")]
    NotSquare { height: usize, width: usize },

    /// No usable pivot during LU decomposition
    #[error("Matrix is singular: no pivot in column {column}")]
    Singular { column: usize },

    /// Element access outside the matrix
    #[error("Index ({row}, {col}) out of bounds for {height}x{width} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },

    /// Backing store length does not match the requested shape
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Matrix shape cannot be read as a 3D vector
    #[error("Cannot convert {height}x{width} matrix to a vector")]
    NotAVector { height: usize, width: usize },

    /// A polygon needs at least three vertices
    #[error("Polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Vertex index outside the polygon
    #[error("Vertex index {index} out of range for polygon with {len} vertices")]
    VertexIndex { index: usize, len: usize },

    /// Flat vertex stream that does not split into triangles
    #[error("Vertex stream of length {0} is not a multiple of 3")]
    VertexStream(usize),
}
