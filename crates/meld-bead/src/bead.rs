//! Bead thickness from flow conservation.
//!
//! Material volume is conserved between the feedstock entering the head and
//! the bead left on the part:
//!
//! ```text
//! feed_velocity * feedstock_area = path_velocity * bead_area
//! ```
//!
//! The bead cross-section is a stadium: two semicircular caps of radius
//! `bead_length / 2` plus a rectangular core `bead_length` long. The core's
//! extra extent is the thickness.

use std::f64::consts::PI;

use crate::BeadParams;

/// Floor on path velocity, guarding the division against a stopped tool.
pub const VELOCITY_EPSILON: f64 = 1e-6;

/// Bead thickness for one sample, clamped to `[0, max_thickness]`.
///
/// A bead area smaller than the caps alone clamps to 0 (a purely round
/// cross-section). A stopped tool produces a huge area that clamps to
/// `max_thickness`. NaN results map to 0.
pub fn thickness(
    feed_velocity: f64,
    path_velocity: f64,
    feedstock_area: f64,
    bead_length: f64,
    max_thickness: f64,
) -> f64 {
    let area = feed_velocity * feedstock_area / path_velocity.max(VELOCITY_EPSILON);
    let bead_radius = bead_length / 2.0;
    let raw = (area - PI * bead_radius * bead_radius) / bead_length;
    if raw.is_nan() {
        return 0.0;
    }
    let upper = if max_thickness > 0.0 { max_thickness } else { 0.0 };
    raw.clamp(0.0, upper)
}

/// Thickness for every sample of a toolpath.
///
/// Rows are independent; the output is parallel to the inputs.
pub fn thickness_profile(feed_velocity: &[f64], path_velocity: &[f64], params: &BeadParams) -> Vec<f64> {
    debug_assert_eq!(feed_velocity.len(), path_velocity.len());
    feed_velocity
        .iter()
        .zip(path_velocity)
        .map(|(&feed, &path)| {
            thickness(
                feed,
                path,
                params.feedstock_area(),
                params.bead_length(),
                params.max_thickness(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BeadSettings, Feedstock};
    use approx::assert_relative_eq;

    #[test]
    fn test_flow_conservation() {
        // area = 2 * 10 / 1 = 20; caps = pi; thickness = (20 - pi) / 2
        let t = thickness(2.0, 1.0, 10.0, 2.0, 100.0);
        assert_relative_eq!(t, (20.0 - PI) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_feed_clamps_to_zero() {
        assert_eq!(thickness(0.0, 10.0, 161.29, 2.0, 5.0), 0.0);
    }

    #[test]
    fn test_zero_path_velocity_clamps_to_max() {
        assert_eq!(thickness(5.0, 0.0, 161.29, 2.0, 5.0), 5.0);
        assert_eq!(thickness(5.0, -3.0, 161.29, 2.0, 5.0), 5.0);
    }

    #[test]
    fn test_always_within_clamp() {
        let max = 4.0;
        for feed in [0.0, 0.1, 1.0, 5.0, 50.0, 1e6] {
            for path in [0.0, 1e-9, 0.5, 10.0, 1e4] {
                let t = thickness(feed, path, 161.29, 2.0, max);
                assert!((0.0..=max).contains(&t), "feed={feed} path={path} t={t}");
            }
        }
    }

    #[test]
    fn test_nan_maps_to_zero() {
        assert_eq!(thickness(f64::NAN, 10.0, 1.0, 2.0, 5.0), 0.0);
    }

    #[test]
    fn test_negative_max_does_not_panic() {
        assert_eq!(thickness(5.0, 1.0, 100.0, 2.0, -1.0), 0.0);
    }

    #[test]
    fn test_profile() {
        let params = BeadSettings {
            feedstock: Feedstock::Square { side: 2.0 },
            max_thickness: 100.0,
            ..Default::default()
        }
        .params()
        .unwrap();
        let profile = thickness_profile(&[0.0, 1.0, 2.0], &[1.0, 1.0, 0.0], &params);
        assert_eq!(profile.len(), 3);
        assert_eq!(profile[0], 0.0);
        assert_relative_eq!(profile[1], (4.0 - PI) / 2.0, epsilon = 1e-12);
        assert_eq!(profile[2], 100.0);
    }
}
