//! Texture page handles
//!
//! A [`TextureHandle`] is the opaque, copyable identity of a GPU texture page
//! plus its pixel size. Handles are minted by a [`TextureRegistry`], the arena
//! owned by whoever loads textures; everything downstream (frames, glyphs,
//! draw requests) holds handles only and never decides texture lifetime.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable identifier of a registered texture page
    pub struct TextureId;
}

impl TextureId {
    /// Get the raw u64 representation (for debugging / logging)
    pub fn to_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// Non-owning reference to a texture page
///
/// Equality, hashing, and ordering consider the id only; the size is cached
/// so UVs can be computed without going back to the registry.
#[derive(Clone, Copy, Debug)]
pub struct TextureHandle {
    id: TextureId,
    width: u32,
    height: u32,
}

impl TextureHandle {
    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// A texture with zero area cannot be sampled
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextureHandle {}

impl Hash for TextureHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TextureHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextureHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

struct Entry<T> {
    width: u32,
    height: u32,
    resource: T,
}

/// Arena of texture pages keyed by [`TextureId`]
///
/// `T` is whatever the owner keeps per page: GPU bind groups in a real
/// backend, `()` for headless use.
pub struct TextureRegistry<T = ()> {
    entries: SlotMap<TextureId, Entry<T>>,
}

impl<T> TextureRegistry<T> {
    /// Register a page and return its handle
    pub fn insert(&mut self, width: u32, height: u32, resource: T) -> TextureHandle {
        let id = self.entries.insert(Entry {
            width,
            height,
            resource,
        });
        tracing::trace!(id = id.to_raw(), width, height, "registered texture page");
        TextureHandle { id, width, height }
    }

    /// Unregister a page, returning its resource.
    ///
    /// Handles already copied into frames become dangling ids; looking them up
    /// afterwards returns `None`.
    pub fn remove(&mut self, handle: TextureHandle) -> Option<T> {
        self.entries.remove(handle.id).map(|e| e.resource)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&T> {
        self.entries.get(handle.id).map(|e| &e.resource)
    }

    /// Re-create a handle from its id
    pub fn handle(&self, id: TextureId) -> Option<TextureHandle> {
        self.entries.get(id).map(|e| TextureHandle {
            id,
            width: e.width,
            height: e.height,
        })
    }

    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.entries.contains_key(handle.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextureRegistry<()> {
    /// Headless registry; use `default()` for registries carrying resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page with no attached resource
    pub fn register(&mut self, width: u32, height: u32) -> TextureHandle {
        self.insert(width, height, ())
    }
}

impl<T> Default for TextureRegistry<T> {
    fn default() -> Self {
        Self {
            entries: SlotMap::with_key(),
        }
    }
}

impl<T> std::fmt::Debug for TextureRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureRegistry")
            .field("pages", &self.entries.len())
            .finish()
    }
}
