#![warn(missing_docs)]

//! Volumetric bead-mesh generation for MELD toolpaths.
//!
//! Converts a time-ordered toolpath (positions plus feed and path velocity)
//! into an indexed triangle mesh of the deposited bead:
//! 1. Bead thickness per sample from flow conservation ([`bead`])
//! 2. A stadium-shaped cross-section ring at each sample ([`cross_section`])
//! 3. A closed tube between consecutive rings ([`segment`])
//! 4. Concatenation into one coloured [`MeshBuffer`] ([`assemble`])
//! 5. Level-of-detail control over ring density and sample stride ([`lod`])
//!
//! # Example
//!
//! ```
//! use meld_bead::{BeadSettings, LodController, LodLevel, MeshAssembler};
//! use meld_toolpath::{ColumnMap, Toolpath};
//!
//! let toolpath = Toolpath::from_columns([
//!     ("XPos", vec![0.0, 1.0, 2.0]),
//!     ("YPos", vec![0.0, 0.0, 0.0]),
//!     ("ZPos", vec![0.0, 0.0, 0.0]),
//!     ("FeedVel", vec![5.0, 5.0, 5.0]),
//!     ("PathVel", vec![10.0, 10.0, 10.0]),
//!     ("ToolTemp", vec![300.0, 310.0, 320.0]),
//! ])
//! .unwrap();
//!
//! let params = BeadSettings::default().params().unwrap();
//! let assembler = MeshAssembler::new(params, ColumnMap::default());
//! let mesh = assembler.generate(&toolpath, "ToolTemp").unwrap();
//! assert_eq!(mesh.num_vertices(), 2 * 2 * 12);
//!
//! let lod = LodController::new(assembler);
//! let coarse = lod.generate_lod(&toolpath, "ToolTemp", LodLevel::Low);
//! assert!(coarse.is_none()); // stride 3 leaves a single sample
//! ```

pub mod assemble;
pub mod bead;
pub mod cross_section;
pub mod error;
pub mod lod;
pub mod segment;

pub use assemble::{MeshAssembler, MeshStats};
pub use bead::{thickness, thickness_profile, VELOCITY_EPSILON};
pub use cross_section::{cross_section, SectionFrame, SectionProfile};
pub use error::{BeadError, Result};
pub use lod::{LodController, LodLevel, LodProfile, LodSettings};
pub use meld_mesh::MeshBuffer;
pub use segment::{build_segment, tube_faces, SegmentMesh, MIN_POINTS};

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Cross-section shape of the feedstock fed into the deposition head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Feedstock {
    /// Round wire or rod.
    Round {
        /// Diameter (mm).
        diameter: f64,
    },
    /// Square bar stock.
    Square {
        /// Side length (mm).
        side: f64,
    },
}

impl Feedstock {
    /// Cross-sectional area (mm²).
    pub fn area(&self) -> f64 {
        match *self {
            Feedstock::Round { diameter } => PI * diameter * diameter / 4.0,
            Feedstock::Square { side } => side * side,
        }
    }

    fn dimension(&self) -> f64 {
        match *self {
            Feedstock::Round { diameter } => diameter,
            Feedstock::Square { side } => side,
        }
    }
}

/// Bead geometry settings as read from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeadSettings {
    /// Long axis of the stadium cross-section (mm).
    pub bead_length: f64,
    /// Cap radius (mm); `None` means `bead_length / 2`.
    pub bead_radius: Option<f64>,
    /// Feedstock fed into the head.
    pub feedstock: Feedstock,
    /// Upper clamp on computed bead thickness (mm).
    pub max_thickness: f64,
    /// Vertices per cross-section ring (even, at least 4).
    pub points_per_section: usize,
    /// Lateral scale of the cap radius (1.0 for the deposited bead).
    pub width_multiplier: f64,
}

impl Default for BeadSettings {
    fn default() -> Self {
        Self {
            bead_length: 2.0,
            bead_radius: None,
            feedstock: Feedstock::Square { side: 12.7 },
            max_thickness: 10.0,
            points_per_section: 12,
            width_multiplier: 1.0,
        }
    }
}

impl BeadSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.bead_length.is_finite() && self.bead_length > 0.0) {
            return Err(BeadError::InvalidSettings(
                "bead_length must be positive".into(),
            ));
        }
        if let Some(r) = self.bead_radius {
            if !(r.is_finite() && r > 0.0) {
                return Err(BeadError::InvalidSettings(
                    "bead_radius must be positive".into(),
                ));
            }
        }
        let dim = self.feedstock.dimension();
        if !(dim.is_finite() && dim > 0.0) {
            return Err(BeadError::InvalidSettings(
                "feedstock dimension must be positive".into(),
            ));
        }
        if !(self.max_thickness.is_finite() && self.max_thickness >= 0.0) {
            return Err(BeadError::InvalidSettings(
                "max_thickness must be non-negative".into(),
            ));
        }
        check_points_per_section(self.points_per_section)?;
        if !(self.width_multiplier.is_finite() && self.width_multiplier > 0.0) {
            return Err(BeadError::InvalidSettings(
                "width_multiplier must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Validate and convert into generation parameters.
    pub fn params(&self) -> Result<BeadParams> {
        BeadParams::try_from(self)
    }
}

pub(crate) fn check_points_per_section(n: usize) -> Result<()> {
    if n < MIN_POINTS || n % 2 != 0 {
        return Err(BeadError::InvalidSettings(format!(
            "points_per_section must be an even number >= {MIN_POINTS}, got {n}"
        )));
    }
    Ok(())
}

/// Validated, immutable parameters for one mesh-generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeadParams {
    bead_length: f64,
    bead_radius: f64,
    feedstock_area: f64,
    max_thickness: f64,
    points_per_section: usize,
    width_multiplier: f64,
}

impl TryFrom<&BeadSettings> for BeadParams {
    type Error = BeadError;

    fn try_from(settings: &BeadSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            bead_length: settings.bead_length,
            bead_radius: settings.bead_radius.unwrap_or(settings.bead_length / 2.0),
            feedstock_area: settings.feedstock.area(),
            max_thickness: settings.max_thickness,
            points_per_section: settings.points_per_section,
            width_multiplier: settings.width_multiplier,
        })
    }
}

impl BeadParams {
    /// Long axis of the stadium cross-section (mm).
    pub fn bead_length(&self) -> f64 {
        self.bead_length
    }

    /// Cap radius (mm).
    pub fn bead_radius(&self) -> f64 {
        self.bead_radius
    }

    /// Feedstock cross-sectional area (mm²).
    pub fn feedstock_area(&self) -> f64 {
        self.feedstock_area
    }

    /// Upper clamp on bead thickness (mm).
    pub fn max_thickness(&self) -> f64 {
        self.max_thickness
    }

    /// Vertices per cross-section ring.
    pub fn points_per_section(&self) -> usize {
        self.points_per_section
    }

    /// Lateral scale of the cap radius.
    pub fn width_multiplier(&self) -> f64 {
        self.width_multiplier
    }

    /// Copy with a different ring density.
    pub fn with_points_per_section(self, points_per_section: usize) -> Self {
        Self {
            points_per_section,
            ..self
        }
    }

    /// Copy with a different lateral scale.
    pub fn with_width_multiplier(self, width_multiplier: f64) -> Self {
        Self {
            width_multiplier,
            ..self
        }
    }

    /// Cross-section shape shared by every ring of a mesh.
    pub fn profile(&self) -> SectionProfile {
        SectionProfile {
            bead_radius: self.bead_radius,
            n_points: self.points_per_section,
            width_multiplier: self.width_multiplier,
        }
    }
}
