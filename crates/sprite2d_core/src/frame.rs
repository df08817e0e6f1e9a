//! Atlas frames and frame lookup
//!
//! A [`Frame`] locates one sub-image inside a texture page. Packers may trim
//! transparent borders and rotate images by 90° to pack tighter; a frame keeps
//! enough information to undo both when drawing.
//!
//! # Conventions
//!
//! - `source` is in page pixels, physically oriented. For a rotated frame the
//!   pixels are stored rotated 90° clockwise, so `source.w` is the logical
//!   height of the trimmed image.
//! - `trim_offset` is where the untrimmed frame origin sits relative to the
//!   trimmed image (zero or negative). The trimmed content starts at
//!   `-trim_offset` inside a logical box of `logical_size`.

use std::f32::consts::FRAC_PI_2;

use indexmap::IndexMap;

use crate::error::{FrameError, Result};
use crate::geometry::{IVec2, IntRect, Vec2};
use crate::texture::TextureHandle;

/// One sub-image of a texture page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Source rectangle in page pixels (physical orientation)
    pub source: IntRect,
    /// Untrimmed origin relative to the trimmed image
    pub trim_offset: IVec2,
    /// Untrimmed size in logical orientation
    pub logical_size: IVec2,
    /// Stored rotated 90° clockwise in the page
    pub rotated: bool,
    /// Owning texture page
    pub page: TextureHandle,
}

/// Frame geometry corrected for trim and packer rotation, ready for a plain
/// textured-quad draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedFrame {
    pub source: IntRect,
    pub page: TextureHandle,
    /// Anchor in unscaled physical source pixels
    pub anchor: Vec2,
    /// Scale along the physical source axes
    pub scale: Vec2,
    /// Rotation in radians including the packer correction
    pub rotation: f32,
}

impl Frame {
    /// A frame covering a whole texture page, untrimmed and unrotated
    pub fn whole(page: TextureHandle) -> Self {
        let size = IVec2::new(page.width() as i32, page.height() as i32);
        Self {
            source: IntRect::new(0, 0, size.x, size.y),
            trim_offset: IVec2::ZERO,
            logical_size: size,
            rotated: false,
            page,
        }
    }

    /// Size of the trimmed content in logical orientation
    pub fn content_size(&self) -> IVec2 {
        if self.rotated {
            self.source.size().swapped()
        } else {
            self.source.size()
        }
    }

    /// Trimmed content rectangle inside the logical frame box
    pub fn content_rect(&self) -> IntRect {
        let size = self.content_size();
        IntRect::new(-self.trim_offset.x, -self.trim_offset.y, size.x, size.y)
    }

    /// True when there is nothing to sample
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Resolve caller placement parameters against the packer's trim and
    /// rotation.
    ///
    /// `anchor` is given in the logical (untrimmed, unrotated) frame box. For a
    /// rotated frame the quad is drawn from the physical source with the
    /// anchor mapped into physical space, scale axes swapped, and the caller's
    /// rotation preceded by a -90° turn that restores logical orientation.
    pub fn resolve(&self, anchor: Vec2, scale: Vec2, rotation: f32) -> ResolvedFrame {
        let anchor = anchor + Vec2::from(self.trim_offset);

        if !self.rotated {
            return ResolvedFrame {
                source: self.source,
                page: self.page,
                anchor,
                scale,
                rotation,
            };
        }

        let content_height = self.content_size().y as f32;
        ResolvedFrame {
            source: self.source,
            page: self.page,
            anchor: Vec2::new(content_height - anchor.y, anchor.x),
            scale: scale.swapped(),
            rotation: rotation - FRAC_PI_2,
        }
    }

    /// Frame for a rectangle given in this frame's logical space.
    ///
    /// Used for bitmap-font glyph cells that live inside a page which may
    /// itself be a trimmed or rotated atlas frame. Parts of `rect` outside the
    /// trimmed content become trim on the returned frame.
    pub fn sub_frame(&self, rect: IntRect) -> Frame {
        let content = self.content_rect();
        let visible = rect.intersection(&content);
        let local = visible.origin() - content.origin();

        let source = if visible.is_empty() {
            IntRect::new(self.source.x, self.source.y, 0, 0)
        } else if self.rotated {
            let content_height = content.h;
            IntRect::new(
                self.source.x + content_height - (local.y + visible.h),
                self.source.y + local.x,
                visible.h,
                visible.w,
            )
        } else {
            IntRect::new(
                self.source.x + local.x,
                self.source.y + local.y,
                visible.w,
                visible.h,
            )
        };

        let trim_offset = if visible.is_empty() {
            IVec2::ZERO
        } else {
            rect.origin() - visible.origin()
        };

        Frame {
            source,
            trim_offset,
            logical_size: rect.size(),
            rotated: self.rotated,
            page: self.page,
        }
    }
}

/// Index-stable handle into a [`FrameTable`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u32);

impl FrameId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lookup from frame key to [`Frame`]
///
/// Keys keep their insertion order, so a [`FrameId`] stays valid for the
/// lifetime of the table.
#[derive(Clone, Debug, Default)]
pub struct FrameTable {
    frames: IndexMap<String, Frame>,
}

impl FrameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: IndexMap::with_capacity(capacity),
        }
    }

    /// Add a frame while loading. The first frame registered under a key wins;
    /// later duplicates are ignored with a warning.
    pub fn insert(&mut self, key: impl Into<String>, frame: Frame) -> FrameId {
        let key = key.into();
        if let Some(index) = self.frames.get_index_of(&key) {
            tracing::warn!(key = %key, "duplicate frame key ignored");
            return FrameId(index as u32);
        }
        let (index, _) = self.frames.insert_full(key, frame);
        FrameId(index as u32)
    }

    /// Look up a frame by key
    pub fn get(&self, key: &str) -> Result<&Frame> {
        self.frames
            .get(key)
            .ok_or_else(|| FrameError::NotFound(key.to_string()))
    }

    /// Handle for a key, for callers that resolve once and draw often
    pub fn id(&self, key: &str) -> Option<FrameId> {
        self.frames.get_index_of(key).map(|i| FrameId(i as u32))
    }

    pub fn by_id(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get_index(id.index()).map(|(_, frame)| frame)
    }

    pub fn key(&self, id: FrameId) -> Option<&str> {
        self.frames.get_index(id.index()).map(|(key, _)| key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.frames.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Frame)> {
        self.frames.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureRegistry;

    fn page() -> TextureHandle {
        TextureRegistry::new().register(256, 256)
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_lookup_by_key_and_id() {
        let mut table = FrameTable::new();
        let frame = Frame::whole(page());
        let id = table.insert("hero/idle/0", frame);

        assert_eq!(table.get("hero/idle/0").unwrap(), &frame);
        assert_eq!(table.id("hero/idle/0"), Some(id));
        assert_eq!(table.by_id(id), Some(&frame));
        assert_eq!(table.key(id), Some("hero/idle/0"));
    }

    #[test]
    fn test_missing_key_is_error() {
        let table = FrameTable::new();
        assert_eq!(
            table.get("nope"),
            Err(FrameError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_duplicate_key_keeps_first() {
        let mut table = FrameTable::new();
        let p = page();
        let first = Frame::whole(p);
        let mut second = first;
        second.source.x = 10;

        let a = table.insert("a", first);
        let b = table.insert("a", second);
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a").unwrap().source.x, 0);
    }

    #[test]
    fn test_content_size_swaps_when_rotated() {
        let frame = Frame {
            source: IntRect::new(0, 0, 16, 32),
            trim_offset: IVec2::ZERO,
            logical_size: IVec2::new(32, 16),
            rotated: true,
            page: page(),
        };
        assert_eq!(frame.content_size(), IVec2::new(32, 16));
    }

    #[test]
    fn test_resolve_unrotated_applies_trim_to_anchor() {
        let frame = Frame {
            source: IntRect::new(10, 10, 20, 20),
            trim_offset: IVec2::new(-3, -4),
            logical_size: IVec2::new(26, 28),
            rotated: false,
            page: page(),
        };
        let resolved = frame.resolve(Vec2::new(13.0, 14.0), Vec2::ONE, 0.5);
        assert!(close(resolved.anchor, Vec2::new(10.0, 10.0)));
        assert_eq!(resolved.rotation, 0.5);
        assert_eq!(resolved.source, frame.source);
    }

    #[test]
    fn test_resolve_rotated_maps_anchor_into_physical_space() {
        let frame = Frame {
            source: IntRect::new(0, 0, 16, 32),
            trim_offset: IVec2::ZERO,
            logical_size: IVec2::new(32, 16),
            rotated: true,
            page: page(),
        };
        let resolved = frame.resolve(Vec2::new(4.0, 2.0), Vec2::new(2.0, 3.0), 0.0);
        assert!(close(resolved.anchor, Vec2::new(14.0, 4.0)));
        assert_eq!(resolved.scale, Vec2::new(3.0, 2.0));
        assert!((resolved.rotation + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_sub_frame_unrotated() {
        let parent = Frame {
            source: IntRect::new(100, 50, 64, 64),
            trim_offset: IVec2::ZERO,
            logical_size: IVec2::new(64, 64),
            rotated: false,
            page: page(),
        };
        let sub = parent.sub_frame(IntRect::new(8, 16, 10, 12));
        assert_eq!(sub.source, IntRect::new(108, 66, 10, 12));
        assert_eq!(sub.logical_size, IVec2::new(10, 12));
        assert_eq!(sub.trim_offset, IVec2::ZERO);
    }

    #[test]
    fn test_sub_frame_rotated_parent() {
        // Logical page 40x20 stored rotated: physical 20 wide, 40 tall
        let parent = Frame {
            source: IntRect::new(0, 0, 20, 40),
            trim_offset: IVec2::ZERO,
            logical_size: IVec2::new(40, 20),
            rotated: true,
            page: page(),
        };
        // Logical top-left 4x2 block lives in the physical top-right corner
        let sub = parent.sub_frame(IntRect::new(0, 0, 4, 2));
        assert_eq!(sub.source, IntRect::new(18, 0, 2, 4));
        assert!(sub.rotated);
        assert_eq!(sub.content_size(), IVec2::new(4, 2));
    }

    #[test]
    fn test_sub_frame_clipped_by_parent_trim() {
        // Content starts 2px in from the left of the logical box
        let parent = Frame {
            source: IntRect::new(0, 0, 30, 30),
            trim_offset: IVec2::new(-2, 0),
            logical_size: IVec2::new(32, 30),
            rotated: false,
            page: page(),
        };
        let sub = parent.sub_frame(IntRect::new(0, 0, 6, 6));
        assert_eq!(sub.source, IntRect::new(0, 0, 4, 6));
        assert_eq!(sub.trim_offset, IVec2::new(-2, 0));
        assert_eq!(sub.content_rect(), IntRect::new(2, 0, 4, 6));
    }
}
