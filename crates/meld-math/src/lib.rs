#![warn(missing_docs)]

//! Math types for MELD bead-mesh generation.
//!
//! Thin wrappers around nalgebra providing the point, vector and direction
//! types used along a toolpath, the global reference axes, and the
//! tolerances that decide when a direction or segment is degenerate.

use nalgebra::{Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Global vertical axis (+Z, the build direction).
pub fn vertical() -> Vec3 {
    Vec3::z()
}

/// Narrow a point to the `f32` layout used by mesh buffers.
pub fn to_f32(p: &Point3) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}

/// Tolerance constants for toolpath geometry.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Segments shorter than this (mm) are treated as coincident samples.
    pub segment: f64,
    /// Directions with a norm below this are treated as zero.
    pub direction: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 mm segment length, 1e-9 direction norm).
    pub const DEFAULT: Self = Self {
        segment: 1e-6,
        direction: 1e-9,
    };

    /// Check if two samples are too close to form a segment.
    ///
    /// Non-finite distances count as degenerate.
    pub fn is_degenerate_segment(&self, a: &Point3, b: &Point3) -> bool {
        let len = (b - a).norm();
        !len.is_finite() || len < self.segment
    }

    /// Normalize `v`, or return `None` if it is too short to carry a direction.
    pub fn normalize(&self, v: &Vec3) -> Option<Dir3> {
        let len = v.norm();
        if len.is_finite() && len >= self.direction {
            Some(Dir3::new_unchecked(v / len))
        } else {
            None
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_degenerate_segment() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::origin();
        assert!(tol.is_degenerate_segment(&a, &a));
        assert!(tol.is_degenerate_segment(&a, &Point3::new(1e-8, 0.0, 0.0)));
        assert!(!tol.is_degenerate_segment(&a, &Point3::new(1e-4, 0.0, 0.0)));
    }

    #[test]
    fn test_degenerate_segment_nan() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::origin();
        let b = Point3::new(f64::NAN, 0.0, 0.0);
        assert!(tol.is_degenerate_segment(&a, &b));
        let c = Point3::new(f64::INFINITY, 0.0, 0.0);
        assert!(tol.is_degenerate_segment(&a, &c));
    }

    #[test]
    fn test_normalize() {
        let tol = Tolerance::DEFAULT;
        let d = tol.normalize(&Vec3::new(3.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(d.as_ref().x, 0.6, epsilon = 1e-12);
        assert_relative_eq!(d.as_ref().y, 0.8, epsilon = 1e-12);
        assert!(tol.normalize(&Vec3::zeros()).is_none());
        assert!(tol.normalize(&Vec3::new(1e-12, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_to_f32() {
        let p = Point3::new(1.5, -2.25, 3.0);
        assert_eq!(to_f32(&p), [1.5f32, -2.25, 3.0]);
    }
}
