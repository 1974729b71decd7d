#![warn(missing_docs)]

//! Columnar toolpath tables for MELD bead-mesh generation.
//!
//! A [`Toolpath`] holds the time-ordered samples logged by the machine as
//! named numeric columns of equal length. Row order is the acquisition order
//! and defines travel direction, so nothing in this crate ever re-sorts rows.
//!
//! # Example
//!
//! ```
//! use meld_toolpath::Toolpath;
//!
//! let toolpath = Toolpath::from_columns([
//!     ("XPos", vec![0.0, 1.0, 2.0]),
//!     ("YPos", vec![0.0, 0.0, 0.0]),
//!     ("ZPos", vec![0.0, 0.0, 0.0]),
//! ])
//! .unwrap();
//! assert_eq!(toolpath.len(), 3);
//! assert_eq!(toolpath.take_every(2).column("XPos"), Some(&[0.0, 2.0][..]));
//! ```

pub mod cache;
pub mod error;

pub use cache::{CacheStats, ToolpathCache, DEFAULT_CAPACITY};
pub use error::{Result, ToolpathError};

use std::collections::BTreeMap;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};

/// Names of the columns the bead model reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// X position column.
    pub x: String,
    /// Y position column.
    pub y: String,
    /// Z position column.
    pub z: String,
    /// Feedstock feed velocity column.
    pub feed_velocity: String,
    /// Tool path (travel) velocity column.
    pub path_velocity: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            x: "XPos".into(),
            y: "YPos".into(),
            z: "ZPos".into(),
            feed_velocity: "FeedVel".into(),
            path_velocity: "PathVel".into(),
        }
    }
}

impl ColumnMap {
    /// All required column names, in a fixed order.
    pub fn required(&self) -> [&str; 5] {
        [
            self.x.as_str(),
            self.y.as_str(),
            self.z.as_str(),
            self.feed_velocity.as_str(),
            self.path_velocity.as_str(),
        ]
    }

    /// Required columns absent from `toolpath`.
    pub fn missing<'a>(&'a self, toolpath: &Toolpath) -> Vec<&'a str> {
        self.required()
            .into_iter()
            .filter(|name| !toolpath.has_column(name))
            .collect()
    }
}

/// Stable content hash identifying a toolpath (or its source text).
///
/// 64-bit FNV-1a over a fixed little-endian byte encoding, so values are
/// identical across processes, platforms and compiler releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Fingerprint raw text, e.g. the JSON a table was loaded from.
    pub fn of_str(text: &str) -> Self {
        let mut hasher = Fnv1a::new();
        hasher.write(text.as_bytes());
        Self(hasher.finish())
    }
}

/// 64-bit FNV-1a.
struct Fnv1a(u64);

impl Fnv1a {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }
}

impl Hasher for Fnv1a {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A time-ordered table of named `f64` columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ToolpathRepr")]
pub struct Toolpath {
    columns: BTreeMap<String, Vec<f64>>,
    #[serde(skip)]
    rows: usize,
}

/// Wire form; `null` cells (NaN in the source table) load as NaN.
#[derive(Deserialize)]
struct ToolpathRepr {
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl TryFrom<ToolpathRepr> for Toolpath {
    type Error = ToolpathError;

    fn try_from(repr: ToolpathRepr) -> Result<Self> {
        Toolpath::from_columns(repr.columns.into_iter().map(|(name, values)| {
            let values: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            (name, values)
        }))
    }
}

impl Toolpath {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// All columns must have the same length. Later duplicates replace
    /// earlier columns of the same name.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        columns
            .into_iter()
            .try_fold(Self::new(), |table, (name, values)| table.with_column(name, values))
    }

    /// Parse a table from its JSON form (`{"columns": {...}}`).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the JSON form accepted by [`Toolpath::from_json`].
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Add or replace a column.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if self.columns.is_empty() || replacing_only {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(ToolpathError::LengthMismatch {
                column: name,
                expected: self.rows,
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(self)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// True if the table has no samples.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Values of a column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Check if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Keep rows `0, stride, 2 * stride, ...`.
    ///
    /// A stride of 0 or 1 returns an unchanged copy.
    pub fn take_every(&self, stride: usize) -> Toolpath {
        if stride <= 1 {
            return self.clone();
        }
        let columns: BTreeMap<String, Vec<f64>> = self
            .columns
            .iter()
            .map(|(name, values)| (name.clone(), values.iter().copied().step_by(stride).collect()))
            .collect();
        Toolpath {
            columns,
            rows: self.rows.div_ceil(stride),
        }
    }

    /// Keep rows for which `keep(row_index)` is true, preserving order.
    pub fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> Toolpath {
        let rows: Vec<usize> = (0..self.rows).filter(|&i| keep(i)).collect();
        let columns: BTreeMap<String, Vec<f64>> = self
            .columns
            .iter()
            .map(|(name, values)| (name.clone(), rows.iter().map(|&i| values[i]).collect()))
            .collect();
        Toolpath {
            columns,
            rows: rows.len(),
        }
    }

    /// Keep only rows where material is being fed (`feed_column > 0`).
    ///
    /// Returns an unchanged copy if the column is absent.
    pub fn extruding_only(&self, feed_column: &str) -> Toolpath {
        match self.column(feed_column) {
            Some(feed) => self.filter_rows(|i| feed[i] > 0.0),
            None => self.clone(),
        }
    }

    /// Content hash over column names and raw value bits.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Fnv1a::new();
        hasher.write(&(self.rows as u64).to_le_bytes());
        for (name, values) in &self.columns {
            hasher.write(name.as_bytes());
            // Terminator keeps ("ab", "c") distinct from ("a", "bc").
            hasher.write(&[0xff]);
            for v in values {
                hasher.write(&v.to_bits().to_le_bytes());
            }
        }
        Fingerprint(hasher.finish())
    }
}
