//! Level-of-detail control for bead meshes.
//!
//! Each level maps to a ring density and a sample stride. Lower levels
//! drop toolpath samples (every `stride`-th row is kept) and use coarser
//! rings, cutting vertex count roughly in proportion.
//!
//! LOD parameters are handed to the assembler per call; the assembler's own
//! parameters are never modified, so calls at different levels cannot leak
//! into one another.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use log::debug;
use meld_mesh::MeshBuffer;
use meld_toolpath::Toolpath;
use serde::{Deserialize, Serialize};

use crate::assemble::{MeshAssembler, MeshStats};
use crate::error::{BeadError, Result};

/// Mesh detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LodLevel {
    /// Coarse rings, every third sample.
    Low,
    /// Default detail.
    #[default]
    Medium,
    /// Fine rings, every sample.
    High,
}

impl LodLevel {
    /// All levels from coarsest to finest.
    pub const ALL: [LodLevel; 3] = [LodLevel::Low, LodLevel::Medium, LodLevel::High];

    /// Parse a level name, falling back to [`LodLevel::Medium`] for
    /// anything unrecognized.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            debug!("unknown LOD level {s:?}, using medium");
            LodLevel::Medium
        })
    }

    /// Lowercase level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LodLevel::Low => "low",
            LodLevel::Medium => "medium",
            LodLevel::High => "high",
        }
    }
}

impl fmt::Display for LodLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LodLevel {
    type Err = BeadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(LodLevel::Low),
            "medium" => Ok(LodLevel::Medium),
            "high" => Ok(LodLevel::High),
            _ => Err(BeadError::InvalidSettings(format!("unknown LOD level {s:?}"))),
        }
    }
}

/// Mesh density for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodProfile {
    /// Vertices per cross-section ring.
    pub points_per_section: usize,
    /// Keep every `stride`-th toolpath sample.
    pub stride: usize,
}

impl LodProfile {
    /// Create a profile.
    pub const fn new(points_per_section: usize, stride: usize) -> Self {
        Self {
            points_per_section,
            stride,
        }
    }
}

/// Profile table for all levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodSettings {
    /// Profile for [`LodLevel::Low`].
    pub low: LodProfile,
    /// Profile for [`LodLevel::Medium`].
    pub medium: LodProfile,
    /// Profile for [`LodLevel::High`].
    pub high: LodProfile,
}

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            low: LodProfile::new(6, 3),
            medium: LodProfile::new(12, 1),
            high: LodProfile::new(24, 1),
        }
    }
}

impl LodSettings {
    /// Profile for a level.
    pub fn profile(&self, level: LodLevel) -> LodProfile {
        match level {
            LodLevel::Low => self.low,
            LodLevel::Medium => self.medium,
            LodLevel::High => self.high,
        }
    }

    /// Validate settings.
    ///
    /// Each level must be at least as detailed as the one below it: ring
    /// density may not decrease and stride may not increase from low to high.
    pub fn validate(&self) -> Result<()> {
        for level in LodLevel::ALL {
            let p = self.profile(level);
            crate::check_points_per_section(p.points_per_section)
                .map_err(|e| BeadError::InvalidSettings(format!("lod.{level}: {e}")))?;
            if p.stride == 0 {
                return Err(BeadError::InvalidSettings(format!(
                    "lod.{level}: stride must be at least 1"
                )));
            }
        }
        for pair in LodLevel::ALL.windows(2) {
            let (lo, hi) = (self.profile(pair[0]), self.profile(pair[1]));
            if hi.points_per_section < lo.points_per_section || hi.stride > lo.stride {
                return Err(BeadError::InvalidSettings(format!(
                    "lod.{} must be at least as detailed as lod.{}",
                    pair[1], pair[0]
                )));
            }
        }
        Ok(())
    }
}

/// Generates meshes at a chosen level of detail.
#[derive(Debug, Clone)]
pub struct LodController {
    assembler: MeshAssembler,
    settings: LodSettings,
}

impl LodController {
    /// Controller with the default profile table.
    pub fn new(assembler: MeshAssembler) -> Self {
        Self {
            assembler,
            settings: LodSettings::default(),
        }
    }

    /// Controller with a custom profile table.
    pub fn with_settings(assembler: MeshAssembler, settings: LodSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            assembler,
            settings,
        })
    }

    /// The profile table.
    pub fn settings(&self) -> &LodSettings {
        &self.settings
    }

    /// The wrapped assembler.
    pub fn assembler(&self) -> &MeshAssembler {
        &self.assembler
    }

    /// Generate the mesh for `toolpath` at `level`.
    pub fn generate_lod(
        &self,
        toolpath: &Toolpath,
        color_column: &str,
        level: LodLevel,
    ) -> Option<MeshBuffer> {
        self.generate_lod_with_stats(toolpath, color_column, level)
            .map(|(mesh, _)| mesh)
    }

    /// Like [`LodController::generate_lod`], also returning generation counters.
    pub fn generate_lod_with_stats(
        &self,
        toolpath: &Toolpath,
        color_column: &str,
        level: LodLevel,
    ) -> Option<(MeshBuffer, MeshStats)> {
        let profile = self.settings.profile(level);
        let params = self
            .assembler
            .params()
            .with_points_per_section(profile.points_per_section);

        let samples = if profile.stride > 1 {
            Cow::Owned(toolpath.take_every(profile.stride))
        } else {
            Cow::Borrowed(toolpath)
        };
        debug!(
            "LOD {level}: {} of {} samples, {} points per section",
            samples.len(),
            toolpath.len(),
            profile.points_per_section
        );
        self.assembler
            .generate_with_params(&samples, color_column, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::tests::make_line;
    use crate::BeadSettings;
    use meld_toolpath::ColumnMap;

    fn controller() -> LodController {
        let params = BeadSettings::default().params().unwrap();
        LodController::new(MeshAssembler::new(params, ColumnMap::default()))
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!("low".parse::<LodLevel>().unwrap(), LodLevel::Low);
        assert_eq!(" HIGH ".parse::<LodLevel>().unwrap(), LodLevel::High);
        assert!("ultra".parse::<LodLevel>().is_err());
        assert_eq!(LodLevel::parse_or_default("ultra"), LodLevel::Medium);
        assert_eq!(LodLevel::parse_or_default("low"), LodLevel::Low);
    }

    #[test]
    fn test_vertex_counts_monotonic() {
        let toolpath = make_line(25);
        let lod = controller();
        let counts: Vec<usize> = LodLevel::ALL
            .iter()
            .map(|&level| {
                lod.generate_lod(&toolpath, "ToolTemp", level)
                    .map_or(0, |m| m.num_vertices())
            })
            .collect();

        // low: 9 samples -> 8 segments * 12; medium: 24 * 24; high: 24 * 48
        assert_eq!(counts, vec![96, 576, 1152]);
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_levels_do_not_leak() {
        let toolpath = make_line(25);
        let lod = controller();
        let before = lod.generate_lod(&toolpath, "ToolTemp", LodLevel::Medium);
        lod.generate_lod(&toolpath, "ToolTemp", LodLevel::High);
        lod.generate_lod(&toolpath, "ToolTemp", LodLevel::Low);
        let after = lod.generate_lod(&toolpath, "ToolTemp", LodLevel::Medium);

        assert_eq!(before, after);
        assert_eq!(lod.assembler().params().points_per_section(), 12);
        // Medium matches a plain generation call.
        assert_eq!(after, lod.assembler().generate(&toolpath, "ToolTemp"));
    }

    #[test]
    fn test_missing_color_is_none_at_every_level() {
        let toolpath = make_line(25);
        let lod = controller();
        for level in LodLevel::ALL {
            assert!(lod.generate_lod(&toolpath, "Nope", level).is_none());
        }
    }

    #[test]
    fn test_settings_validation() {
        assert!(LodSettings::default().validate().is_ok());

        let inverted = LodSettings {
            low: LodProfile::new(24, 1),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let zero_stride = LodSettings {
            high: LodProfile::new(24, 0),
            ..Default::default()
        };
        assert!(zero_stride.validate().is_err());

        let odd = LodSettings {
            low: LodProfile::new(5, 3),
            ..Default::default()
        };
        let params = BeadSettings::default().params().unwrap();
        let assembler = MeshAssembler::new(params, ColumnMap::default());
        assert!(LodController::with_settings(assembler, odd).is_err());
    }

    #[test]
    fn test_settings_json() {
        let json = r#"{"low": {"points_per_section": 8, "stride": 2}}"#;
        let settings: LodSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.low, LodProfile::new(8, 2));
        assert_eq!(settings.high, LodProfile::new(24, 1));
    }
}
