//! Texture atlas built from a packer manifest
//!
//! The manifest mirrors the JSON export of common rect packers: a list of
//! pages, each with the images packed into it. Parsing the file itself is the
//! loader's business; anything serde can read works.

use serde::Deserialize;

use crate::error::{AtlasError, Result};
use crate::frame::{Frame, FrameId, FrameTable};
use crate::geometry::{IVec2, IntRect};
use crate::texture::TextureHandle;

/// Packed image entry
///
/// `width`/`height` describe the trimmed image in logical orientation; when
/// `rotated` is set the page stores it with the two swapped.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ManifestImage {
    #[serde(rename = "n")]
    pub name: String,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "w")]
    pub width: i32,
    #[serde(rename = "h")]
    pub height: i32,
    #[serde(rename = "fx", default)]
    pub frame_x: i32,
    #[serde(rename = "fy", default)]
    pub frame_y: i32,
    #[serde(rename = "fw", default)]
    pub frame_width: i32,
    #[serde(rename = "fh", default)]
    pub frame_height: i32,
    #[serde(rename = "r", default)]
    pub rotated: u8,
}

/// One atlas page and its images
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ManifestPage {
    /// Page image name, without extension
    pub name: String,
    pub images: Vec<ManifestImage>,
}

/// Parsed packer manifest
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct AtlasManifest {
    pub textures: Vec<ManifestPage>,
}

impl ManifestImage {
    fn to_frame(&self, page: TextureHandle) -> Frame {
        let rotated = self.rotated > 0;
        let (w, h) = if rotated {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };

        // Untrimmed exports leave the frame size at zero
        let logical_size = if self.frame_width > 0 && self.frame_height > 0 {
            IVec2::new(self.frame_width, self.frame_height)
        } else {
            IVec2::new(self.width, self.height)
        };

        Frame {
            source: IntRect::new(self.x, self.y, w, h),
            trim_offset: IVec2::new(self.frame_x, self.frame_y),
            logical_size,
            rotated,
            page,
        }
    }
}

/// A set of texture pages plus the frames packed into them
#[derive(Clone, Debug, Default)]
pub struct TextureAtlas {
    pages: Vec<TextureHandle>,
    frames: FrameTable,
}

impl TextureAtlas {
    /// Build an atlas from a manifest.
    ///
    /// `resolve_page` maps a page name to a loaded texture; returning `None`
    /// aborts the build. Nothing is kept from a failed build.
    pub fn from_manifest<F>(manifest: &AtlasManifest, mut resolve_page: F) -> std::result::Result<Self, AtlasError>
    where
        F: FnMut(&str) -> Option<TextureHandle>,
    {
        let image_count = manifest.textures.iter().map(|p| p.images.len()).sum();
        let mut frames = FrameTable::with_capacity(image_count);
        let mut pages = Vec::with_capacity(manifest.textures.len());

        for page in &manifest.textures {
            let texture = resolve_page(&page.name)
                .ok_or_else(|| AtlasError::PageNotFound(page.name.clone()))?;

            for image in &page.images {
                if image.width <= 0 || image.height <= 0 {
                    return Err(AtlasError::InvalidImage {
                        page: page.name.clone(),
                        name: image.name.clone(),
                    });
                }
                frames.insert(image.name.clone(), image.to_frame(texture));
            }
            pages.push(texture);
        }

        tracing::debug!(
            pages = pages.len(),
            frames = frames.len(),
            "texture atlas built"
        );

        Ok(Self { pages, frames })
    }

    /// Assemble an atlas from frames produced elsewhere
    pub fn from_parts(pages: Vec<TextureHandle>, frames: FrameTable) -> Self {
        Self { pages, frames }
    }

    /// Look up a frame by key
    pub fn get(&self, key: &str) -> Result<&Frame> {
        self.frames.get(key)
    }

    pub fn id(&self, key: &str) -> Option<FrameId> {
        self.frames.id(key)
    }

    pub fn by_id(&self, id: FrameId) -> Option<&Frame> {
        self.frames.by_id(id)
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn pages(&self) -> &[TextureHandle] {
        &self.pages
    }
}
