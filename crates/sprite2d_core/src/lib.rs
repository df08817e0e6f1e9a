//! sprite2d Core
//!
//! Foundational types shared by the text layout and sprite batching crates:
//!
//! - **Geometry**: float and integer vectors, rectangles, projection matrices
//! - **Color**: 8-bit RGBA tints
//! - **Textures**: opaque page handles and the registry that mints them
//! - **Frames**: atlas sub-images with trim and packer-rotation correction
//! - **Atlas**: pages plus a frame table, built from a packer manifest
//!
//! # Example
//!
//! ```rust
//! use sprite2d_core::{Frame, FrameTable, TextureRegistry};
//!
//! let mut textures = TextureRegistry::new();
//! let page = textures.register(256, 256);
//!
//! let mut frames = FrameTable::new();
//! frames.insert("background", Frame::whole(page));
//!
//! assert_eq!(frames.get("background").unwrap().page, page);
//! assert!(frames.get("missing").is_err());
//! ```

pub mod atlas;
pub mod color;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod texture;

pub use atlas::{AtlasManifest, ManifestImage, ManifestPage, TextureAtlas};
pub use color::Color;
pub use error::{AtlasError, FrameError, Result};
pub use frame::{Frame, FrameId, FrameTable, ResolvedFrame};
pub use geometry::{IVec2, IntRect, Mat4, Rect, Vec2};
pub use texture::{TextureHandle, TextureId, TextureRegistry};
