//! Error types for mesh buffers.

use thiserror::Error;

/// Errors raised when a mesh buffer would violate its invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Index of the offending face.
        face: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The colour array is not parallel to the vertex array.
    #[error("{colors} vertex colors for {vertices} vertices")]
    ColorCountMismatch {
        /// Number of vertices.
        vertices: usize,
        /// Number of colour values.
        colors: usize,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
