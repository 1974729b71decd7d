#![warn(missing_docs)]

//! Indexed triangle mesh buffer for MELD bead meshes.
//!
//! A [`MeshBuffer`] is the single artifact produced by bead-mesh generation:
//! three parallel arrays holding vertex positions, triangle indices into
//! those positions, and one scalar colour value per vertex. It is a value
//! type; once built it is never mutated.
//!
//! Renderers consume it through independent adapters:
//! - [`plotly::Mesh3dTrace`] for scene-graph plotting (`mesh3d` traces)
//! - [`polydata::PolyData`] for VTK-style interactive viewers
//!
//! # Example
//!
//! ```
//! use meld_mesh::MeshBuilder;
//!
//! let mut builder = MeshBuilder::with_capacity(3, 1);
//! builder.append(
//!     &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//!     &[[0, 1, 2]],
//!     &[0.5, 0.5, 0.5],
//! );
//! let mesh = builder.finish().unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

pub mod error;
pub mod plotly;
pub mod polydata;

pub use error::{MeshError, Result};

use serde::{Deserialize, Serialize};

/// Output triangle mesh for rendering and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeshBuffer")]
pub struct MeshBuffer {
    vertices: Vec<[f32; 3]>,
    faces: Vec<[u32; 3]>,
    vertex_colors: Vec<f32>,
}

/// Wire form; NaN colours serialize as `null` and load back as NaN.
#[derive(Deserialize)]
struct RawMeshBuffer {
    vertices: Vec<[f32; 3]>,
    faces: Vec<[u32; 3]>,
    vertex_colors: Vec<Option<f32>>,
}

impl TryFrom<RawMeshBuffer> for MeshBuffer {
    type Error = MeshError;

    fn try_from(raw: RawMeshBuffer) -> Result<Self> {
        let colors = raw
            .vertex_colors
            .into_iter()
            .map(|c| c.unwrap_or(f32::NAN))
            .collect();
        Self::new(raw.vertices, raw.faces, colors)
    }
}

impl MeshBuffer {
    /// Create a mesh buffer, checking index and colour invariants.
    pub fn new(
        vertices: Vec<[f32; 3]>,
        faces: Vec<[u32; 3]>,
        vertex_colors: Vec<f32>,
    ) -> Result<Self> {
        let mesh = Self {
            vertices,
            faces,
            vertex_colors,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Check that every face index is in range and colours parallel vertices.
    pub fn validate(&self) -> Result<()> {
        if self.vertex_colors.len() != self.vertices.len() {
            return Err(MeshError::ColorCountMismatch {
                vertices: self.vertices.len(),
                colors: self.vertex_colors.len(),
            });
        }
        let vertex_count = self.vertices.len();
        for (face, tri) in self.faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// Triangle vertex indices.
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Scalar colour value per vertex.
    pub fn vertex_colors(&self) -> &[f32] {
        &self.vertex_colors
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices[1..] {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        Some((min, max))
    }

    /// Range of the colour field as `(min, max)`, ignoring NaN values.
    pub fn color_range(&self) -> Option<(f32, f32)> {
        self.vertex_colors
            .iter()
            .copied()
            .filter(|c| !c.is_nan())
            .fold(None, |acc, c| match acc {
                None => Some((c, c)),
                Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
            })
    }

    /// Consume the mesh, returning `(vertices, faces, vertex_colors)`.
    pub fn into_parts(self) -> (Vec<[f32; 3]>, Vec<[u32; 3]>, Vec<f32>) {
        (self.vertices, self.faces, self.vertex_colors)
    }
}

/// Incrementally concatenates local vertex/face blocks into one buffer.
///
/// Face indices of each appended block are local to that block and get
/// offset by the running vertex count, as [`MeshBuffer`] requires.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<[f32; 3]>,
    faces: Vec<[u32; 3]>,
    vertex_colors: Vec<f32>,
}

impl MeshBuilder {
    /// Create a builder with room for `vertices` vertices and `faces` faces.
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
            vertex_colors: Vec::with_capacity(vertices),
        }
    }

    /// Number of vertices appended so far.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Append a block of vertices with block-local face indices.
    pub fn append(&mut self, vertices: &[[f32; 3]], faces: &[[u32; 3]], colors: &[f32]) {
        debug_assert_eq!(vertices.len(), colors.len());
        debug_assert!(faces.iter().flatten().all(|&i| (i as usize) < vertices.len()));

        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.vertex_colors.extend_from_slice(colors);
        self.faces
            .extend(faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
    }

    /// Finish the mesh, trimming spare capacity.
    ///
    /// Returns `None` if nothing was appended.
    pub fn finish(mut self) -> Option<MeshBuffer> {
        if self.vertices.is_empty() {
            return None;
        }
        self.vertices.shrink_to_fit();
        self.faces.shrink_to_fit();
        self.vertex_colors.shrink_to_fit();
        Some(MeshBuffer {
            vertices: self.vertices,
            faces: self.faces,
            vertex_colors: self.vertex_colors,
        })
    }
}
