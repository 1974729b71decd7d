//! Error types for bead-mesh generation.

use thiserror::Error;

/// Errors raised by bead settings validation.
///
/// Generation itself never errors: inputs it cannot turn into a mesh yield
/// `None`, and degenerate geometry is handled in place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeadError {
    /// Invalid bead or LOD settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for bead operations.
pub type Result<T> = std::result::Result<T, BeadError>;
