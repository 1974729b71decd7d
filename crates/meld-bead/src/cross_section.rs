//! Stadium-shaped bead cross-sections oriented along the travel direction.

use std::f64::consts::PI;

use meld_math::{to_f32, vertical, Dir3, Point3, Tolerance, Vec3};

/// Shape parameters shared by every ring of one mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionProfile {
    /// Radius of the two semicircular caps (mm).
    pub bead_radius: f64,
    /// Vertices per ring.
    pub n_points: usize,
    /// Lateral scale of the cap radius.
    pub width_multiplier: f64,
}

/// Orthonormal basis of a cross-section plane.
///
/// - **Tangent**: travel direction, normal to the section plane
/// - **Lateral**: horizontal width axis (tangent × global Z)
/// - **Up**: lateral × tangent
#[derive(Debug, Clone, Copy)]
pub struct SectionFrame {
    /// Unit travel direction.
    pub tangent: Dir3,
    /// Unit lateral (width) axis.
    pub lateral: Dir3,
    /// Unit up axis.
    pub up: Dir3,
}

impl SectionFrame {
    /// Build a frame for travel along `direction`.
    ///
    /// A zero-length direction falls back to global +Y; vertical travel
    /// (no horizontal component) falls back to a global +X lateral axis.
    pub fn from_direction(direction: &Vec3) -> Self {
        let tol = Tolerance::DEFAULT;
        let tangent = tol
            .normalize(direction)
            .unwrap_or_else(|| Dir3::new_unchecked(Vec3::y()));
        let lateral = tol
            .normalize(&tangent.as_ref().cross(&vertical()))
            .unwrap_or_else(|| Dir3::new_unchecked(Vec3::x()));
        let up = Dir3::new_normalize(lateral.as_ref().cross(tangent.as_ref()));
        Self {
            tangent,
            lateral,
            up,
        }
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| start + step * i as f64)
}

/// Build the cross-section ring at `position`.
///
/// The first half of the ring traces the cap centred at
/// `position - lateral * thickness / 2` (angles π/2 → 3π/2), the second half
/// the cap centred at `position + lateral * thickness / 2` (angles
/// -π/2 → π/2). The angle sequence depends only on `n_points`, so rings built
/// with the same profile line up index for index.
pub fn cross_section(
    position: &Point3,
    direction: &Vec3,
    thickness: f64,
    profile: &SectionProfile,
) -> Vec<[f32; 3]> {
    let frame = SectionFrame::from_direction(direction);
    let lateral = frame.lateral.into_inner();
    let up = frame.up.into_inner();

    let half = profile.n_points / 2;
    let rest = profile.n_points - half;
    let offset = lateral * (thickness / 2.0);
    let lateral_radius = profile.bead_radius * profile.width_multiplier;

    let left = linspace(PI / 2.0, 3.0 * PI / 2.0, half).map(|a| (position - offset, a));
    let right = linspace(-PI / 2.0, PI / 2.0, rest).map(|a| (position + offset, a));

    left.chain(right)
        .map(|(center, angle)| {
            let (sin, cos) = angle.sin_cos();
            let p = center + lateral * (lateral_radius * cos) + up * (profile.bead_radius * sin);
            to_f32(&p)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile(n_points: usize) -> SectionProfile {
        SectionProfile {
            bead_radius: 1.0,
            n_points,
            width_multiplier: 1.0,
        }
    }

    fn assert_orthonormal(frame: &SectionFrame) {
        let (t, l, u) = (frame.tangent.as_ref(), frame.lateral.as_ref(), frame.up.as_ref());
        assert!(t.dot(l).abs() < 1e-12);
        assert!(t.dot(u).abs() < 1e-12);
        assert!(l.dot(u).abs() < 1e-12);
        assert_relative_eq!(u.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_horizontal_travel() {
        let frame = SectionFrame::from_direction(&Vec3::new(2.0, 0.0, 0.0));
        assert_orthonormal(&frame);
        assert_relative_eq!(frame.lateral.as_ref().y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.up.as_ref().z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_vertical_travel_falls_back() {
        let frame = SectionFrame::from_direction(&Vec3::new(0.0, 0.0, 3.0));
        assert_orthonormal(&frame);
        assert_relative_eq!(frame.lateral.as_ref().x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_zero_direction_falls_back() {
        let frame = SectionFrame::from_direction(&Vec3::zeros());
        assert_orthonormal(&frame);
        assert_relative_eq!(frame.tangent.as_ref().y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ring_shape() {
        let center = Point3::new(1.0, 2.0, 3.0);
        let thickness = 0.5;
        let ring = cross_section(&center, &Vec3::x(), thickness, &profile(12));
        assert_eq!(ring.len(), 12);

        // Travel along +X: lateral is -Y, up is +Z. Every vertex lies in the
        // x = 1 plane, within radius of one of the two cap centres.
        for v in &ring {
            assert_relative_eq!(v[0], 1.0, epsilon = 1e-6);
            let dz = v[2] as f64 - 3.0;
            let dy_a = v[1] as f64 - (2.0 + thickness / 2.0);
            let dy_b = v[1] as f64 - (2.0 - thickness / 2.0);
            let on_a = (dy_a.hypot(dz) - 1.0).abs() < 1e-5;
            let on_b = (dy_b.hypot(dz) - 1.0).abs() < 1e-5;
            assert!(on_a || on_b, "vertex {v:?} is off both caps");
        }

        // First vertex is the top of the first cap, sixth the bottom.
        assert_relative_eq!(ring[0][2], 4.0, epsilon = 1e-6);
        assert_relative_eq!(ring[5][2], 2.0, epsilon = 1e-6);
        // Widest point of the first cap sits at -lateral = +Y.
        let max_y = ring.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        assert_relative_eq!(max_y as f64, 2.0 + thickness / 2.0 + 1.0, epsilon = 0.1);
    }

    #[test]
    fn test_width_multiplier_scales_lateral_only() {
        let wide = SectionProfile {
            width_multiplier: 2.0,
            ..profile(24)
        };
        let ring = cross_section(&Point3::origin(), &Vec3::x(), 0.0, &wide);
        let max_y = ring.iter().map(|v| v[1].abs()).fold(0.0f32, f32::max);
        let max_z = ring.iter().map(|v| v[2].abs()).fold(0.0f32, f32::max);
        assert!(max_y > 1.9 && max_y <= 2.0 + 1e-6);
        assert_relative_eq!(max_z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_deterministic_and_finite() {
        let p = Point3::new(0.5, 0.5, 0.5);
        for dir in [Vec3::x(), Vec3::z(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)] {
            let a = cross_section(&p, &dir, 0.3, &profile(8));
            let b = cross_section(&p, &dir, 0.3, &profile(8));
            assert_eq!(a, b);
            assert!(a.iter().flatten().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_odd_point_count() {
        let ring = cross_section(&Point3::origin(), &Vec3::x(), 0.0, &profile(5));
        assert_eq!(ring.len(), 5);
    }
}
