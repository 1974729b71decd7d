//! Plotly `mesh3d` trace adapter.
//!
//! Plotly wants positions and indices split into per-axis arrays
//! (`x/y/z`, `i/j/k`) and the scalar field as `intensity`.

use serde::Serialize;

use crate::MeshBuffer;

/// Default colourscale for bead meshes.
pub const DEFAULT_COLORSCALE: &str = "Viridis";

/// A Plotly `mesh3d` trace, ready to serialize into a figure's `data` array.
#[derive(Debug, Clone, Serialize)]
pub struct Mesh3dTrace {
    /// Always `"mesh3d"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Trace name shown in the legend.
    pub name: String,
    /// Vertex x coordinates.
    pub x: Vec<f32>,
    /// Vertex y coordinates.
    pub y: Vec<f32>,
    /// Vertex z coordinates.
    pub z: Vec<f32>,
    /// First vertex index of each face.
    pub i: Vec<u32>,
    /// Second vertex index of each face.
    pub j: Vec<u32>,
    /// Third vertex index of each face.
    pub k: Vec<u32>,
    /// Per-vertex scalar used for colouring.
    pub intensity: Vec<f32>,
    /// Named Plotly colourscale.
    pub colorscale: String,
    /// Show the colour bar.
    pub showscale: bool,
    /// Flat (per-face) shading; off so ring colours blend along segments.
    pub flatshading: bool,
}

impl Mesh3dTrace {
    /// Build a trace from a mesh buffer.
    pub fn from_mesh(mesh: &MeshBuffer, name: impl Into<String>) -> Self {
        let n = mesh.num_vertices();
        let m = mesh.num_faces();
        let (mut x, mut y, mut z) = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
        for v in mesh.vertices() {
            x.push(v[0]);
            y.push(v[1]);
            z.push(v[2]);
        }
        let (mut i, mut j, mut k) = (Vec::with_capacity(m), Vec::with_capacity(m), Vec::with_capacity(m));
        for f in mesh.faces() {
            i.push(f[0]);
            j.push(f[1]);
            k.push(f[2]);
        }

        Self {
            kind: "mesh3d",
            name: name.into(),
            x,
            y,
            z,
            i,
            j,
            k,
            intensity: mesh.vertex_colors().to_vec(),
            colorscale: DEFAULT_COLORSCALE.into(),
            showscale: true,
            flatshading: false,
        }
    }

    /// Replace the colourscale.
    pub fn with_colorscale(mut self, colorscale: impl Into<String>) -> Self {
        self.colorscale = colorscale.into();
        self
    }
}
