//! Bitmap font text for sprite2d
//!
//! This crate provides:
//! - Bitmap fonts built from BMFont-style descriptors (per-character frames,
//!   offsets, advances, and kerning pairs)
//! - A text layout engine that projects strings into positioned glyph frames
//!   with kerning, word wrap, and explicit line breaks
//! - `FontText`, a cached layout with typewriter-style reveal progress

pub mod font;
pub mod layout;
pub mod text;

pub use font::{
    BitmapFont, CharDescriptor, CharMetric, FontCommon, FontDescriptor, FontInfo,
    KerningDescriptor, KerningTable,
};
pub use layout::{project_text, LayoutOptions, ProjectedGlyph};
pub use text::FontText;

use thiserror::Error;

/// Text layout errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("Glyph not found for character: {0:?}")]
    GlyphNotFound(char),

    #[error("Font page {page} referenced by character {id} does not exist")]
    PageOutOfRange { id: u32, page: usize },

    #[error(transparent)]
    Frame(#[from] sprite2d_core::FrameError),
}

pub type Result<T> = std::result::Result<T, TextError>;
