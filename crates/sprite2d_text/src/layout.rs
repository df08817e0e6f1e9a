//! Text layout engine
//!
//! Projects a string onto a bitmap font: one forward pass, a word at a time.
//! Each word is committed to the current line first; if it then overflows the
//! maximum width, the glyphs just emitted are moved down a line in place
//! instead of measuring every word twice. Words are never split.

use sprite2d_core::{Frame, IVec2};

use crate::font::{BitmapFont, CharMetric};
use crate::{Result, TextError};

/// Options for text layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Wrap width in pixels; 0 disables wrapping
    pub max_width: u32,
    /// Added to every character advance
    pub horizontal_spacing: i32,
    /// Added to the font's line height
    pub line_spacing: i32,
    /// Apply the font's kerning pairs
    pub kerning: bool,
    /// Character whose metrics stand in for characters missing from the font.
    /// When `None`, a missing character fails the layout.
    pub fallback: Option<char>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_width: 0,
            horizontal_spacing: 0,
            line_spacing: 0,
            kerning: true,
            fallback: None,
        }
    }
}

/// A character cell placed relative to the text origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedGlyph {
    /// Character this glyph was laid out for
    pub ch: char,
    /// Cell frame on the font page
    pub frame: Frame,
    /// Top-left of the cell, relative to `{0, 0}`
    pub destination: IVec2,
}

impl ProjectedGlyph {
    /// Right edge of the cell
    pub fn right(&self) -> i32 {
        self.destination.x + self.frame.logical_size.x
    }
}

fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

fn lookup(font: &BitmapFont, ch: char, fallback: Option<char>) -> Result<&CharMetric> {
    if let Some(metric) = font.char_metric(ch) {
        return Ok(metric);
    }
    match fallback.and_then(|f| font.char_metric(f)) {
        Some(metric) => {
            tracing::trace!(?ch, "substituting fallback glyph");
            Ok(metric)
        }
        None => Err(TextError::GlyphNotFound(ch)),
    }
}

/// Cursor x at which a line starting with `ch` begins
fn line_start_x(font: &BitmapFont, ch: Option<char>, fallback: Option<char>) -> Result<i32> {
    match ch {
        Some(ch) if !is_line_break(ch) => Ok(-lookup(font, ch, fallback)?.offset.x),
        _ => Ok(0),
    }
}

/// Lay out `text` with `font`, writing glyphs into `glyphs` (cleared first).
///
/// Returns the furthest cursor position reached after any word: x is past
/// the last advance, y is the baseline of the lowest line holding a word.
/// Empty text or an unloaded font yields no glyphs and a zero extent.
///
/// This does a hash lookup per character; call it when the text or options
/// change, not every frame.
pub fn project_text(
    font: &BitmapFont,
    text: &str,
    options: &LayoutOptions,
    glyphs: &mut Vec<ProjectedGlyph>,
) -> Result<IVec2> {
    glyphs.clear();
    if text.is_empty() || !font.is_loaded() {
        return Ok(IVec2::ZERO);
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let base = font.base();
    let line_advance = font.line_height() + options.line_spacing;
    let max_width = i32::try_from(options.max_width).unwrap_or(i32::MAX);
    let fallback = options.fallback;

    glyphs.reserve(len);

    let mut cursor = IVec2::new(line_start_x(font, chars.first().copied(), fallback)?, base);
    let mut extent = IVec2::ZERO;
    // A word that overflows on a line with no other word stays put
    let mut line_has_word = false;

    let mut i = 0;
    while i < len {
        let ch = chars[i];

        if is_line_break(ch) {
            let next = if ch == '\r' && chars.get(i + 1) == Some(&'\n') {
                i + 2
            } else {
                i + 1
            };
            if next < len {
                cursor.x = line_start_x(font, Some(chars[next]), fallback)?;
                cursor.y += line_advance;
                line_has_word = false;
            }
            i = next;
            continue;
        }

        if ch == ' ' {
            let space = lookup(font, ' ', fallback)?;
            if options.kerning && i > 0 && !is_line_break(chars[i - 1]) {
                cursor.x += font.kerning(chars[i - 1], ' ');
            }

            glyphs.push(ProjectedGlyph {
                ch,
                frame: space.frame,
                destination: IVec2::new(
                    cursor.x + space.offset.x,
                    cursor.y - base + space.offset.y,
                ),
            });

            // Spaces never wrap, and don't count toward the extent
            cursor.x += space.advance as i32 + options.horizontal_spacing;
            i += 1;
            continue;
        }

        // Word: runs until the next whitespace character
        let mut end = i + 1;
        while end < len && !chars[end].is_whitespace() {
            end += 1;
        }

        let first = glyphs.len();
        let mut word_width = 0;
        for w in i..end {
            let c = chars[w];
            let metric = lookup(font, c, fallback)?;

            if options.kerning && w > 0 && !is_line_break(chars[w - 1]) {
                word_width += font.kerning(chars[w - 1], c);
            }

            glyphs.push(ProjectedGlyph {
                ch: c,
                frame: metric.frame,
                destination: IVec2::new(
                    cursor.x + word_width + metric.offset.x,
                    cursor.y - base + metric.offset.y,
                ),
            });

            word_width += metric.advance as i32 + options.horizontal_spacing;
        }

        let overflows = max_width != 0
            && line_has_word
            && glyphs.last().is_some_and(|g| g.right() > max_width);

        if overflows {
            // Move the committed word to the start of the next line
            let shift = IVec2::new(-glyphs[first].destination.x, line_advance);
            for glyph in &mut glyphs[first..] {
                glyph.destination += shift;
            }
            cursor += shift;
        }

        cursor.x += word_width;
        line_has_word = true;

        extent.x = extent.x.max(cursor.x);
        extent.y = extent.y.max(cursor.y);

        i = end;
    }

    Ok(extent)
}
