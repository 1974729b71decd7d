//! VTK-style polygon mesh adapter.
//!
//! Interactive VTK viewers store faces as one padded array where every cell
//! is prefixed by its vertex count: `[3, i0, j0, k0, 3, i1, j1, k1, ...]`.
//! Scalars ride along as named point data.

use std::collections::BTreeMap;
use std::fmt;

use crate::MeshBuffer;

/// Polygon mesh in VTK layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyData {
    /// Point coordinates.
    pub points: Vec<[f32; 3]>,
    /// Padded cell array (`[count, idx..., count, idx..., ...]`).
    pub faces: Vec<u32>,
    /// Named per-point scalar arrays.
    pub point_data: BTreeMap<String, Vec<f32>>,
}

impl PolyData {
    /// Wrap a mesh buffer, exposing its colours under `scalar_name`.
    pub fn from_mesh(mesh: &MeshBuffer, scalar_name: &str) -> Self {
        let mut faces = Vec::with_capacity(mesh.num_faces() * 4);
        for f in mesh.faces() {
            faces.push(3);
            faces.extend_from_slice(f);
        }
        let mut point_data = BTreeMap::new();
        point_data.insert(scalar_name.to_string(), mesh.vertex_colors().to_vec());

        Self {
            points: mesh.vertices().to_vec(),
            faces,
            point_data,
        }
    }

    /// Number of polygon cells.
    pub fn n_cells(&self) -> usize {
        self.cells().count()
    }

    /// Iterate cells as index slices.
    pub fn cells(&self) -> impl Iterator<Item = &[u32]> {
        let mut rest = self.faces.as_slice();
        std::iter::from_fn(move || {
            let (&count, tail) = rest.split_first()?;
            let count = (count as usize).min(tail.len());
            let (cell, next) = tail.split_at(count);
            rest = next;
            Some(cell)
        })
    }

    /// Legacy ASCII `.vtk` document, for `write!` or `to_string()`.
    pub fn legacy_vtk<'a>(&'a self, title: &'a str) -> LegacyVtk<'a> {
        LegacyVtk { poly: self, title }
    }

    /// Render as a legacy ASCII `.vtk` document.
    pub fn to_legacy_vtk(&self, title: &str) -> String {
        self.legacy_vtk(title).to_string()
    }
}

/// Legacy ASCII VTK rendering of a [`PolyData`].
///
/// Legacy readers parse scalars by stream extraction, which rejects `nan`
/// and `inf` tokens. Non-finite scalars are written as the smallest finite
/// value of their array, or 0 if the array has none.
#[derive(Debug, Clone, Copy)]
pub struct LegacyVtk<'a> {
    poly: &'a PolyData,
    title: &'a str,
}

impl fmt::Display for LegacyVtk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let poly = self.poly;
        writeln!(f, "# vtk DataFile Version 3.0")?;
        writeln!(f, "{}", self.title.lines().next().unwrap_or(""))?;
        writeln!(f, "ASCII")?;
        writeln!(f, "DATASET POLYDATA")?;
        writeln!(f, "POINTS {} float", poly.points.len())?;
        for p in &poly.points {
            writeln!(f, "{} {} {}", p[0], p[1], p[2])?;
        }

        writeln!(f, "POLYGONS {} {}", poly.n_cells(), poly.faces.len())?;
        for cell in poly.cells() {
            write!(f, "{}", cell.len())?;
            for idx in cell {
                write!(f, " {idx}")?;
            }
            writeln!(f)?;
        }

        if !poly.point_data.is_empty() {
            writeln!(f, "POINT_DATA {}", poly.points.len())?;
            for (name, values) in &poly.point_data {
                let fill = values
                    .iter()
                    .copied()
                    .filter(|v| v.is_finite())
                    .reduce(f32::min)
                    .unwrap_or(0.0);
                writeln!(f, "SCALARS {} float 1", name.replace(char::is_whitespace, "_"))?;
                writeln!(f, "LOOKUP_TABLE default")?;
                for &v in values {
                    writeln!(f, "{}", if v.is_finite() { v } else { fill })?;
                }
            }
        }
        Ok(())
    }
}
