//! Mesh output formats.

use anyhow::Result;
use clap::ValueEnum;
use meld_mesh::plotly::Mesh3dTrace;
use meld_mesh::polydata::PolyData;
use meld_mesh::MeshBuffer;

/// Output format for generated meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Raw mesh buffer (`vertices`, `faces`, `vertex_colors`).
    Json,
    /// Plotly figure holding one `mesh3d` trace.
    Plotly,
    /// Legacy ASCII VTK polydata with the colour column as point scalars.
    Vtk,
    /// Binary STL (geometry only).
    Stl,
}

impl Format {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Plotly => "plotly.json",
            Format::Vtk => "vtk",
            Format::Stl => "stl",
        }
    }
}

/// Encode `mesh` for writing. `name` labels the trace or document and
/// `scalar` names the colour field.
pub fn encode(mesh: &MeshBuffer, format: Format, name: &str, scalar: &str) -> Result<Vec<u8>> {
    let bytes = match format {
        Format::Json => serde_json::to_vec(mesh)?,
        Format::Plotly => {
            let trace = Mesh3dTrace::from_mesh(mesh, name);
            serde_json::to_vec(&serde_json::json!({ "data": [trace] }))?
        }
        Format::Vtk => PolyData::from_mesh(mesh, scalar)
            .to_legacy_vtk(name)
            .into_bytes(),
        Format::Stl => stl_bytes(mesh),
    };
    Ok(bytes)
}

/// Binary STL with per-face normals.
pub fn stl_bytes(mesh: &MeshBuffer) -> Vec<u8> {
    let vertices = mesh.vertices();
    let faces = mesh.faces();
    let mut data = Vec::with_capacity(84 + faces.len() * 50);

    let mut header = [b' '; 80];
    let title = b"meld bead mesh";
    header[..title.len()].copy_from_slice(title);
    data.extend_from_slice(&header);
    data.extend_from_slice(&(faces.len() as u32).to_le_bytes());

    for face in faces {
        let [v0, v1, v2] = face.map(|i| vertices[i as usize]);

        let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let nx = e1[1] * e2[2] - e1[2] * e2[1];
        let ny = e1[2] * e2[0] - e1[0] * e2[2];
        let nz = e1[0] * e2[1] - e1[1] * e2[0];
        let len = (nx * nx + ny * ny + nz * nz).sqrt();
        let normal = if len > 1e-10 {
            [nx / len, ny / len, nz / len]
        } else {
            [0.0, 0.0, 1.0]
        };

        for c in normal.iter().chain(v0.iter()).chain(v1.iter()).chain(v2.iter()) {
            data.extend_from_slice(&c.to_le_bytes());
        }
        // Attribute byte count
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    data
}
