//! Tube mesh between two consecutive cross-sections.

use meld_math::{Point3, Tolerance};

use crate::cross_section::{cross_section, SectionProfile};

/// Smallest ring size that still closes into a tube.
pub const MIN_POINTS: usize = 4;

/// Vertices and faces of one segment, with segment-local indices.
///
/// Indices `[0, n)` are the ring at the start sample and `[n, 2n)` the ring
/// at the end sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentMesh {
    /// Both rings, start ring first.
    pub vertices: Vec<[f32; 3]>,
    /// Triangles indexing into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl SegmentMesh {
    /// True for a skipped (degenerate) segment.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices per ring.
    pub fn ring_len(&self) -> usize {
        self.vertices.len() / 2
    }
}

/// Side faces of a tube joining two rings of `n` vertices.
///
/// Two triangles per ring position; indices wrap modulo `n` so the last
/// quad joins back to the first.
pub fn tube_faces(n: usize) -> Vec<[u32; 3]> {
    let n = n as u32;
    let mut faces = Vec::with_capacity(2 * n as usize);
    for j in 0..n {
        let v1 = j;
        let v2 = (j + 1) % n;
        let v3 = n + j;
        let v4 = n + (j + 1) % n;
        faces.push([v1, v3, v4]);
        faces.push([v1, v4, v2]);
    }
    faces
}

/// Build the tube for the segment `p1 → p2`.
///
/// Segments shorter than the segment tolerance are skipped and return an
/// empty mesh. Both rings use the segment's own travel direction so they
/// share orientation. Ring sizes below [`MIN_POINTS`] are raised to it.
pub fn build_segment(
    p1: &Point3,
    p2: &Point3,
    thickness1: f64,
    thickness2: f64,
    profile: &SectionProfile,
) -> SegmentMesh {
    if Tolerance::DEFAULT.is_degenerate_segment(p1, p2) {
        return SegmentMesh::default();
    }
    let profile = SectionProfile {
        n_points: profile.n_points.max(MIN_POINTS),
        ..*profile
    };
    let direction = p2 - p1;

    let mut vertices = cross_section(p1, &direction, thickness1, &profile);
    vertices.extend(cross_section(p2, &direction, thickness2, &profile));

    SegmentMesh {
        vertices,
        faces: tube_faces(profile.n_points),
    }
}
