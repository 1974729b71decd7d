//! Whole-toolpath mesh assembly.
//!
//! Thickness is computed for every sample in one pass up front; a single
//! sequential pass then stitches each consecutive sample pair into a tube and
//! appends it to one global buffer.

use log::{debug, trace};
use meld_math::Point3;
use meld_mesh::{MeshBuffer, MeshBuilder};
use meld_toolpath::{ColumnMap, Toolpath};

use crate::bead::thickness_profile;
use crate::segment::{build_segment, MIN_POINTS};
use crate::BeadParams;

/// Counters describing one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshStats {
    /// Consecutive sample pairs considered.
    pub segments: usize,
    /// Pairs skipped as degenerate.
    pub skipped: usize,
    /// Vertices emitted.
    pub vertices: usize,
    /// Faces emitted.
    pub faces: usize,
}

/// Borrowed views of the columns one generation call reads.
struct Columns<'a> {
    x: &'a [f64],
    y: &'a [f64],
    z: &'a [f64],
    feed: &'a [f64],
    path: &'a [f64],
    color: &'a [f64],
}

impl<'a> Columns<'a> {
    fn resolve(toolpath: &'a Toolpath, map: &ColumnMap, color_column: &str) -> Option<Self> {
        let missing = map.missing(toolpath);
        if !missing.is_empty() {
            debug!("toolpath is missing required columns {missing:?}");
            return None;
        }
        let Some(color) = toolpath.column(color_column) else {
            debug!("toolpath has no color column {color_column:?}");
            return None;
        };
        Some(Self {
            x: toolpath.column(&map.x)?,
            y: toolpath.column(&map.y)?,
            z: toolpath.column(&map.z)?,
            feed: toolpath.column(&map.feed_velocity)?,
            path: toolpath.column(&map.path_velocity)?,
            color,
        })
    }

    fn position(&self, i: usize) -> Point3 {
        Point3::new(self.x[i], self.y[i], self.z[i])
    }
}

/// Generates bead meshes for toolpaths with fixed parameters.
///
/// Holds no mutable state, so one assembler can serve any number of calls
/// (including concurrent ones).
#[derive(Debug, Clone)]
pub struct MeshAssembler {
    params: BeadParams,
    columns: ColumnMap,
}

impl MeshAssembler {
    /// Create an assembler.
    pub fn new(params: BeadParams, columns: ColumnMap) -> Self {
        Self { params, columns }
    }

    /// Bead parameters used by [`MeshAssembler::generate`].
    pub fn params(&self) -> &BeadParams {
        &self.params
    }

    /// Column names read from toolpaths.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Generate the bead mesh for `toolpath`, coloured by `color_column`.
    ///
    /// Returns `None` when the toolpath cannot produce a mesh: fewer than two
    /// samples, a missing position/velocity/colour column, or every segment
    /// degenerate.
    pub fn generate(&self, toolpath: &Toolpath, color_column: &str) -> Option<MeshBuffer> {
        self.generate_with_stats(toolpath, color_column)
            .map(|(mesh, _)| mesh)
    }

    /// Like [`MeshAssembler::generate`], also returning generation counters.
    pub fn generate_with_stats(
        &self,
        toolpath: &Toolpath,
        color_column: &str,
    ) -> Option<(MeshBuffer, MeshStats)> {
        self.generate_with_params(toolpath, color_column, &self.params)
    }

    /// Generate with parameters other than the assembler's own.
    pub fn generate_with_params(
        &self,
        toolpath: &Toolpath,
        color_column: &str,
        params: &BeadParams,
    ) -> Option<(MeshBuffer, MeshStats)> {
        if toolpath.len() < 2 {
            debug!("toolpath has {} samples, need at least 2", toolpath.len());
            return None;
        }
        let cols = Columns::resolve(toolpath, &self.columns, color_column)?;

        let thickness = thickness_profile(cols.feed, cols.path, params);
        let profile = params.profile();
        let ring = profile.n_points.max(MIN_POINTS);
        let segments = toolpath.len() - 1;

        let mut builder = MeshBuilder::with_capacity(segments * 2 * ring, segments * 2 * ring);
        let mut colors = Vec::with_capacity(2 * ring);
        let mut stats = MeshStats {
            segments,
            ..Default::default()
        };

        for i in 0..segments {
            let p1 = cols.position(i);
            let p2 = cols.position(i + 1);
            let seg = build_segment(&p1, &p2, thickness[i], thickness[i + 1], &profile);
            if seg.is_empty() {
                trace!("skipping degenerate segment {i}");
                stats.skipped += 1;
                continue;
            }

            let n = seg.ring_len();
            colors.clear();
            colors.extend(std::iter::repeat(cols.color[i] as f32).take(n));
            colors.extend(std::iter::repeat(cols.color[i + 1] as f32).take(n));
            builder.append(&seg.vertices, &seg.faces, &colors);
        }

        let mesh = builder.finish()?;
        stats.vertices = mesh.num_vertices();
        stats.faces = mesh.num_faces();
        debug!(
            "bead mesh: {} vertices, {} faces, {}/{} segments skipped",
            stats.vertices, stats.faces, stats.skipped, stats.segments
        );
        Some((mesh, stats))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{BeadSettings, Feedstock};

    /// `n` samples along +X in unit steps, constant velocities.
    pub(crate) fn make_line(n: usize) -> Toolpath {
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Toolpath::from_columns([
            ("XPos", xs.clone()),
            ("YPos", vec![0.0; n]),
            ("ZPos", vec![0.0; n]),
            ("FeedVel", vec![5.0; n]),
            ("PathVel", vec![10.0; n]),
            ("ToolTemp", xs.iter().map(|x| 300.0 + 10.0 * x).collect()),
        ])
        .unwrap()
    }

    fn assembler(max_thickness: f64) -> MeshAssembler {
        let params = BeadSettings {
            bead_length: 2.0,
            feedstock: Feedstock::Square { side: 10.0 },
            max_thickness,
            points_per_section: 12,
            ..Default::default()
        }
        .params()
        .unwrap();
        MeshAssembler::new(params, ColumnMap::default())
    }

    #[test]
    fn test_straight_line_scenario() {
        // Area 5 * 100 / 10 = 50 gives a raw thickness of ~23.4, clamped to 0.5.
        let toolpath = make_line(5);
        let (mesh, stats) = assembler(0.5)
            .generate_with_stats(&toolpath, "ToolTemp")
            .unwrap();

        assert_eq!(stats.segments, 4);
        assert_eq!(stats.skipped, 0);
        assert_eq!(mesh.num_vertices(), 96);
        assert_eq!(mesh.num_faces(), 96);
        assert!(mesh.validate().is_ok());

        // Segment i carries sample i's value on its first ring and sample
        // i + 1's on its second.
        let temps = toolpath.column("ToolTemp").unwrap();
        for (seg, chunk) in mesh.vertex_colors().chunks(24).enumerate() {
            assert!(chunk[..12].iter().all(|&c| c == temps[seg] as f32));
            assert!(chunk[12..].iter().all(|&c| c == temps[seg + 1] as f32));
        }

        // Clamped thickness 0.5 with radius 1: lateral half-width 1.25.
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min[0], 0.0);
        assert_eq!(max[0], 4.0);
        assert!(max[1] <= 1.25 + 1e-6 && max[1] > 1.2);
        assert!((max[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_face_indices_in_range() {
        let mut xs: Vec<f64> = (0..30).map(|i| (i as f64 * 0.3).sin()).collect();
        xs[7] = xs[6];
        let n = xs.len();
        let toolpath = Toolpath::from_columns([
            ("XPos", xs),
            ("YPos", (0..n).map(|i| i as f64 * 0.1).collect()),
            ("ZPos", vec![1.0; n]),
            ("FeedVel", (0..n).map(|i| i as f64).collect()),
            ("PathVel", vec![8.0; n]),
        ])
        .unwrap();
        let mesh = assembler(2.0).generate(&toolpath, "FeedVel").unwrap();
        let count = mesh.num_vertices() as u32;
        assert!(mesh.faces().iter().flatten().all(|&i| i < count));
        assert_eq!(mesh.vertex_colors().len(), mesh.num_vertices());
    }

    #[test]
    fn test_degenerate_segments_skipped() {
        let toolpath = Toolpath::from_columns([
            ("XPos", vec![0.0, 0.0, 1.0, 1.0]),
            ("YPos", vec![0.0; 4]),
            ("ZPos", vec![0.0; 4]),
            ("FeedVel", vec![5.0; 4]),
            ("PathVel", vec![10.0; 4]),
        ])
        .unwrap();
        let (mesh, stats) = assembler(1.0)
            .generate_with_stats(&toolpath, "XPos")
            .unwrap();
        assert_eq!(stats.segments, 3);
        assert_eq!(stats.skipped, 2);
        assert_eq!(mesh.num_vertices(), 24);
        assert_eq!(mesh.faces()[0], [0, 12, 13]);
    }

    #[test]
    fn test_all_degenerate_is_none() {
        let toolpath = Toolpath::from_columns([
            ("XPos", vec![2.0; 3]),
            ("YPos", vec![0.0; 3]),
            ("ZPos", vec![0.0; 3]),
            ("FeedVel", vec![5.0; 3]),
            ("PathVel", vec![10.0; 3]),
        ])
        .unwrap();
        assert!(assembler(1.0).generate(&toolpath, "XPos").is_none());
    }

    #[test]
    fn test_missing_color_column() {
        assert!(assembler(1.0).generate(&make_line(5), "Spindle").is_none());
    }

    #[test]
    fn test_missing_position_column() {
        let toolpath = Toolpath::from_columns([
            ("XPos", vec![0.0, 1.0]),
            ("YPos", vec![0.0, 0.0]),
            ("FeedVel", vec![5.0, 5.0]),
            ("PathVel", vec![10.0, 10.0]),
        ])
        .unwrap();
        assert!(assembler(1.0).generate(&toolpath, "XPos").is_none());
    }

    #[test]
    fn test_single_sample_and_empty() {
        let a = assembler(1.0);
        assert!(a.generate(&make_line(1), "ToolTemp").is_none());
        assert!(a.generate(&Toolpath::new(), "ToolTemp").is_none());
    }

    #[test]
    fn test_deterministic() {
        let toolpath = make_line(12);
        let a = assembler(0.8).generate(&toolpath, "ToolTemp").unwrap();
        let b = assembler(0.8).generate(&toolpath, "ToolTemp").unwrap();

        let bits = |m: &MeshBuffer| -> Vec<u32> {
            m.vertices()
                .iter()
                .flatten()
                .chain(m.vertex_colors())
                .map(|v| v.to_bits())
                .collect()
        };
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.faces(), b.faces());
    }

    #[test]
    fn test_custom_column_names() {
        let toolpath = Toolpath::from_columns([
            ("x", vec![0.0, 1.0]),
            ("y", vec![0.0, 0.0]),
            ("z", vec![0.0, 0.0]),
            ("feed", vec![1.0, 1.0]),
            ("speed", vec![1.0, 1.0]),
        ])
        .unwrap();
        let columns = ColumnMap {
            x: "x".into(),
            y: "y".into(),
            z: "z".into(),
            feed_velocity: "feed".into(),
            path_velocity: "speed".into(),
        };
        let a = MeshAssembler::new(*assembler(1.0).params(), columns);
        assert_eq!(a.generate(&toolpath, "z").unwrap().num_vertices(), 24);
    }
}
