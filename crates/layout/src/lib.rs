//! Layout manifests: the container rectangle and one rectangle plus image
//! source per grid cell.
//!
//! A manifest is either read from a YAML/JSON file or generated from a
//! directory of images with a [`GridSpec`].
//!
//! # Invariants
//! - A validated manifest has at least one plane.
//! - Every plane rectangle has positive size and lies inside the container.

pub mod grid;
pub mod manifest;

pub use grid::GridSpec;
pub use manifest::{LayoutManifest, PlaneSpec};

/// Errors from loading, saving, or validating a layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported manifest format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid layout: {0}")]
    Invalid(String),
}
