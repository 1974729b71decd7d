//! TOML configuration file.
//!
//! ```toml
//! [bead]
//! bead_length = 2.0
//! max_thickness = 8.0
//! feedstock = { shape = "round", diameter = 9.5 }
//!
//! [columns]
//! feed_velocity = "FeedRate"
//!
//! [lod.low]
//! points_per_section = 8
//! stride = 2
//! ```
//!
//! Every table and key is optional and falls back to its default.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use meld_bead::{BeadSettings, LodController, LodSettings, MeshAssembler};
use meld_toolpath::ColumnMap;
use serde::{Deserialize, Serialize};

/// Contents of a `meld` configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeldConfig {
    pub bead: BeadSettings,
    pub columns: ColumnMap,
    pub lod: LodSettings,
}

impl MeldConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("in config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Assembler for the configured bead model and columns.
    pub fn assembler(&self) -> Result<MeshAssembler> {
        let params = self.bead.params().context("invalid [bead] settings")?;
        Ok(MeshAssembler::new(params, self.columns.clone()))
    }

    /// LOD controller over [`MeldConfig::assembler`].
    pub fn lod_controller(&self) -> Result<LodController> {
        LodController::with_settings(self.assembler()?, self.lod).context("invalid [lod] settings")
    }
}
