//! Cached text
//!
//! [`FontText`] owns a string, its layout options, and the glyphs laid out
//! from them. Setters only re-run layout when a value actually changes, so a
//! `FontText` can be updated every frame from UI state cheaply.

use std::sync::Arc;

use sprite2d_core::IVec2;

use crate::font::BitmapFont;
use crate::layout::{project_text, LayoutOptions, ProjectedGlyph};
use crate::Result;

/// A string laid out with a bitmap font
///
/// `progress` limits how many glyphs are drawn, for text revealed gradually.
/// It counts characters of the source text, which includes line breaks that
/// produce no glyph; compare against [`FontText::glyphs`] when checking
/// whether everything is visible.
#[derive(Debug, Clone, Default)]
pub struct FontText {
    font: Option<Arc<BitmapFont>>,
    text: String,
    options: LayoutOptions,
    glyphs: Vec<ProjectedGlyph>,
    extent: IVec2,
    progress: usize,
}

impl FontText {
    /// Lay out `text` with `font`, fully revealed
    pub fn new(
        font: Arc<BitmapFont>,
        text: impl Into<String>,
        options: LayoutOptions,
    ) -> Result<Self> {
        let text = text.into();
        let mut this = Self {
            font: Some(font),
            progress: text.chars().count(),
            text,
            options,
            glyphs: Vec::new(),
            extent: IVec2::ZERO,
        };
        this.relayout()?;
        Ok(this)
    }

    pub fn font(&self) -> Option<&Arc<BitmapFont>> {
        self.font.as_ref()
    }

    pub fn set_font(&mut self, font: Option<Arc<BitmapFont>>) -> Result<&mut Self> {
        let same = match (&self.font, &font) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.font = font;
            self.relayout()?;
        }
        Ok(self)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text; progress resets to fully revealed
    pub fn set_text(&mut self, text: &str) -> Result<&mut Self> {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
            self.progress = text.chars().count();
            self.relayout()?;
        }
        Ok(self)
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) -> Result<&mut Self> {
        if self.options != options {
            self.options = options;
            self.relayout()?;
        }
        Ok(self)
    }

    /// Wrap width in pixels; 0 disables wrapping
    pub fn set_max_width(&mut self, max_width: u32) -> Result<&mut Self> {
        self.set_options(LayoutOptions {
            max_width,
            ..self.options.clone()
        })
    }

    pub fn set_horizontal_spacing(&mut self, horizontal_spacing: i32) -> Result<&mut Self> {
        self.set_options(LayoutOptions {
            horizontal_spacing,
            ..self.options.clone()
        })
    }

    /// Added to the font's line height
    pub fn set_line_spacing(&mut self, line_spacing: i32) -> Result<&mut Self> {
        self.set_options(LayoutOptions {
            line_spacing,
            ..self.options.clone()
        })
    }

    pub fn set_kerning(&mut self, kerning: bool) -> Result<&mut Self> {
        self.set_options(LayoutOptions {
            kerning,
            ..self.options.clone()
        })
    }

    pub fn set_fallback(&mut self, fallback: Option<char>) -> Result<&mut Self> {
        self.set_options(LayoutOptions {
            fallback,
            ..self.options.clone()
        })
    }

    /// Laid out glyphs; empty without a font or text
    pub fn glyphs(&self) -> &[ProjectedGlyph] {
        &self.glyphs
    }

    /// Furthest cursor position reached by the layout
    pub fn extent(&self) -> IVec2 {
        self.extent
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    /// Limit drawing to the first `progress` glyphs
    pub fn set_progress(&mut self, progress: usize) -> &mut Self {
        self.progress = progress;
        self
    }

    pub fn reveal_all(&mut self) -> &mut Self {
        self.progress = self.text.chars().count();
        self
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.progress >= self.glyphs.len()
    }

    /// Glyphs currently revealed by `progress`
    pub fn visible_glyphs(&self) -> &[ProjectedGlyph] {
        &self.glyphs[..self.progress.min(self.glyphs.len())]
    }

    fn relayout(&mut self) -> Result<()> {
        let Some(font) = self.font.as_deref() else {
            self.glyphs.clear();
            self.extent = IVec2::ZERO;
            return Ok(());
        };

        match project_text(font, &self.text, &self.options, &mut self.glyphs) {
            Ok(extent) => {
                self.extent = extent;
                Ok(())
            }
            Err(err) => {
                self.glyphs.clear();
                self.extent = IVec2::ZERO;
                Err(err)
            }
        }
    }
}
