//! Bitmap fonts
//!
//! A [`BitmapFont`] is a table of pre-rendered character cells living on one
//! or more texture pages, plus the metrics needed to place them. Pages are
//! [`Frame`]s, so a font can draw from standalone textures or from frames
//! packed into a shared atlas.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use sprite2d_core::{Frame, IVec2, IntRect, TextureAtlas};

use crate::{Result, TextError};

/// Placement metrics for one character
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharMetric {
    /// Character cell on its page
    pub frame: Frame,
    /// Offset of the cell from the cursor: x is added to the cursor x,
    /// y is measured from the line top
    pub offset: IVec2,
    /// Horizontal cursor advance after this character
    pub advance: i16,
}

/// Pairwise kerning adjustments keyed by `(first, second)` character codes
#[derive(Clone, Debug, Default)]
pub struct KerningTable {
    pairs: FxHashMap<(u32, u32), i32>,
}

impl KerningTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair; the first amount registered for a pair wins
    pub fn insert(&mut self, first: u32, second: u32, amount: i32) {
        self.pairs.entry((first, second)).or_insert(amount);
    }

    /// Adjustment for an ordered pair, zero when absent
    pub fn get(&self, first: char, second: char) -> i32 {
        self.pairs
            .get(&(first as u32, second as u32))
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Descriptor (BMFont field layout, as exported to JSON by common tools)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FontInfo {
    #[serde(default)]
    pub face: String,
    #[serde(default)]
    pub size: i32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FontCommon {
    /// Distance between consecutive baselines
    pub line_height: i32,
    /// Distance from the line top to the baseline
    pub base: i32,
    #[serde(default)]
    pub scale_w: i32,
    #[serde(default)]
    pub scale_h: i32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct CharDescriptor {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub xoffset: i32,
    pub yoffset: i32,
    pub xadvance: i16,
    #[serde(default)]
    pub page: usize,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct KerningDescriptor {
    pub first: u32,
    pub second: u32,
    pub amount: i32,
}

/// Parsed bitmap font descriptor
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FontDescriptor {
    #[serde(default)]
    pub info: FontInfo,
    pub common: FontCommon,
    /// Page image file names, indexed by page id
    #[serde(default)]
    pub pages: Vec<String>,
    pub chars: Vec<CharDescriptor>,
    #[serde(default)]
    pub kernings: Vec<KerningDescriptor>,
}

/// Pre-rendered font
#[derive(Clone, Debug, Default)]
pub struct BitmapFont {
    name: String,
    size: i32,
    base: i32,
    line_height: i32,
    pages: Vec<Frame>,
    chars: FxHashMap<u32, CharMetric>,
    kernings: KerningTable,
}

impl BitmapFont {
    /// Build a font whose pages are already resolved, indexed by page id
    pub fn from_descriptor(descriptor: &FontDescriptor, pages: Vec<Frame>) -> Result<Self> {
        let mut chars =
            FxHashMap::with_capacity_and_hasher(descriptor.chars.len(), Default::default());

        for c in &descriptor.chars {
            let page = pages.get(c.page).ok_or(TextError::PageOutOfRange {
                id: c.id,
                page: c.page,
            })?;

            chars.entry(c.id).or_insert(CharMetric {
                frame: page.sub_frame(IntRect::new(c.x, c.y, c.width, c.height)),
                offset: IVec2::new(c.xoffset, c.yoffset),
                advance: c.xadvance,
            });
        }

        let mut kernings = KerningTable::new();
        for k in &descriptor.kernings {
            kernings.insert(k.first, k.second, k.amount);
        }

        tracing::debug!(
            font = %descriptor.info.face,
            chars = chars.len(),
            kernings = kernings.len(),
            pages = pages.len(),
            "bitmap font built"
        );

        Ok(Self {
            name: descriptor.info.face.clone(),
            size: descriptor.info.size,
            base: descriptor.common.base,
            line_height: descriptor.common.line_height,
            pages,
            chars,
            kernings,
        })
    }

    /// Build a font whose pages were packed into `atlas`.
    ///
    /// Each page file is looked up as `texture_root/<file without extension>`.
    pub fn from_atlas(
        descriptor: &FontDescriptor,
        atlas: &TextureAtlas,
        texture_root: &str,
    ) -> Result<Self> {
        let pages = descriptor
            .pages
            .iter()
            .map(|file| atlas.get(&page_key(texture_root, file)).copied())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Self::from_descriptor(descriptor, pages)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size the font was rendered at
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Distance from the line top to the baseline
    pub fn base(&self) -> i32 {
        self.base
    }

    pub fn line_height(&self) -> i32 {
        self.line_height
    }

    pub fn is_loaded(&self) -> bool {
        !self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Frame] {
        &self.pages
    }

    pub fn char_metric(&self, ch: char) -> Option<&CharMetric> {
        self.chars.get(&(ch as u32))
    }

    /// Metrics for `ch`, failing when the font has no such character
    pub fn metric(&self, ch: char) -> Result<&CharMetric> {
        self.char_metric(ch).ok_or(TextError::GlyphNotFound(ch))
    }

    pub fn kerning(&self, first: char, second: char) -> i32 {
        self.kernings.get(first, second)
    }

    pub fn kernings(&self) -> &KerningTable {
        &self.kernings
    }

    pub fn char_count(&self) -> usize {
        self.chars.len()
    }
}

fn page_key(root: &str, file: &str) -> String {
    let stem = Path::new(file).with_extension("");
    let stem = stem.to_string_lossy();
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        stem.into_owned()
    } else {
        format!("{root}/{stem}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprite2d_core::{FrameError, FrameTable, TextureRegistry};

    const DESCRIPTOR: &str = r#"{
        "info": { "face": "Pixel", "size": 16 },
        "common": { "lineHeight": 18, "base": 14, "scaleW": 128, "scaleH": 128 },
        "pages": ["pixel_0.png"],
        "chars": [
            { "id": 65, "x": 0, "y": 0, "width": 8, "height": 12, "xoffset": 1, "yoffset": 2, "xadvance": 9, "page": 0 },
            { "id": 86, "x": 8, "y": 0, "width": 8, "height": 12, "xoffset": 0, "yoffset": 2, "xadvance": 9, "page": 0 },
            { "id": 32, "x": 0, "y": 0, "width": 0, "height": 0, "xoffset": 0, "yoffset": 0, "xadvance": 4, "page": 0 }
        ],
        "kernings": [ { "first": 65, "second": 86, "amount": -2 } ]
    }"#;

    fn descriptor() -> FontDescriptor {
        serde_json::from_str(DESCRIPTOR).unwrap()
    }

    #[test]
    fn test_from_descriptor_with_standalone_page() {
        let mut textures = TextureRegistry::new();
        let page = Frame::whole(textures.register(128, 128));
        let font = BitmapFont::from_descriptor(&descriptor(), vec![page]).unwrap();

        assert!(font.is_loaded());
        assert_eq!(font.name(), "Pixel");
        assert_eq!(font.base(), 14);
        assert_eq!(font.line_height(), 18);

        let a = font.metric('A').unwrap();
        assert_eq!(a.frame.source, IntRect::new(0, 0, 8, 12));
        assert_eq!(a.offset, IVec2::new(1, 2));
        assert_eq!(a.advance, 9);

        assert_eq!(font.kerning('A', 'V'), -2);
        assert_eq!(font.kerning('V', 'A'), 0);
        assert_eq!(font.metric('Z'), Err(TextError::GlyphNotFound('Z')));
    }

    #[test]
    fn test_from_atlas_resolves_page_frames() {
        let mut textures = TextureRegistry::new();
        let sheet = textures.register(512, 512);
        let mut frames = FrameTable::new();
        let mut page = Frame::whole(sheet);
        page.source = IntRect::new(200, 100, 128, 128);
        page.logical_size = IVec2::new(128, 128);
        frames.insert("fonts/pixel_0", page);
        let atlas = TextureAtlas::from_parts(vec![sheet], frames);

        let font = BitmapFont::from_atlas(&descriptor(), &atlas, "fonts/").unwrap();
        let v = font.metric('V').unwrap();
        assert_eq!(v.frame.source, IntRect::new(208, 100, 8, 12));
        assert_eq!(v.frame.page, sheet);
    }

    #[test]
    fn test_from_atlas_missing_page() {
        let atlas = TextureAtlas::default();
        let err = BitmapFont::from_atlas(&descriptor(), &atlas, "fonts").unwrap_err();
        assert_eq!(
            err,
            TextError::Frame(FrameError::NotFound("fonts/pixel_0".to_string()))
        );
    }

    #[test]
    fn test_page_out_of_range() {
        let err = BitmapFont::from_descriptor(&descriptor(), Vec::new()).unwrap_err();
        assert!(matches!(err, TextError::PageOutOfRange { page: 0, .. }));
    }

    #[test]
    fn test_page_key() {
        assert_eq!(page_key("", "font.png"), "font");
        assert_eq!(page_key("ui/fonts", "font_0.png"), "ui/fonts/font_0");
        assert_eq!(page_key("ui", "noext"), "ui/noext");
        assert_eq!(page_key("ui", "pages/font.v2.png"), "ui/pages/font.v2");
        assert_eq!(page_key("", "dir.d/page"), "dir.d/page");
    }

    #[test]
    fn test_default_font_is_unloaded() {
        assert!(!BitmapFont::default().is_loaded());
    }
}
