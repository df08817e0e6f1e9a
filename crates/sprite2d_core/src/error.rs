//! Error types for sprite2d_core

use thiserror::Error;

/// Frame lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// No frame is registered under this key
    #[error("frame not found: {0}")]
    NotFound(String),
}

/// Errors raised while building a texture atlas from a packer manifest
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// The page resolver could not provide a texture for this page
    #[error("atlas page not found: {0}")]
    PageNotFound(String),

    /// An image entry has a negative or zero size
    #[error("invalid image '{name}' on page '{page}'")]
    InvalidImage { page: String, name: String },
}

/// Result type for frame lookups
pub type Result<T> = std::result::Result<T, FrameError>;
