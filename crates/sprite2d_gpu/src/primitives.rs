//! GPU-ready sprite data
//!
//! Defines the vertex format shared by the batcher and every backend, plus
//! the per-frame request and batch records. Vertex structures use `#[repr(C)]`
//! and implement `bytemuck::Pod` for direct buffer copies.

use smallvec::{smallvec, SmallVec};
use sprite2d_core::TextureHandle;

/// Vertex attribute formats (must match the shader inputs)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    /// Two 32-bit floats
    Float32x2,
    /// Four normalized unsigned bytes
    Unorm8x4,
}

impl VertexFormat {
    /// Size in bytes
    pub const fn size(self) -> u32 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Unorm8x4 => 4,
        }
    }
}

/// One attribute of an interleaved vertex
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub format: VertexFormat,
    /// Byte offset within the vertex
    pub offset: u32,
    /// Shader input location
    pub location: u32,
}

/// Interleaved vertex layout handed to [`GpuProgram::initialize`]
///
/// [`GpuProgram::initialize`]: crate::program::GpuProgram::initialize
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    /// Bytes between consecutive vertices
    pub stride: u32,
    pub attributes: SmallVec<[VertexAttribute; 4]>,
}

/// A sprite vertex (matches shader `VertexInput`)
///
/// Memory layout:
/// - position: [f32; 2] - 8 bytes, pixels before projection
/// - uv: [f32; 2]       - 8 bytes, normalized page coordinates
/// - color: [u8; 4]     - 4 bytes, RGBA tint
/// Total: 20 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

impl SpriteVertex {
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: std::mem::size_of::<SpriteVertex>() as u32,
            attributes: smallvec![
                VertexAttribute {
                    name: "position",
                    format: VertexFormat::Float32x2,
                    offset: 0,
                    location: 0,
                },
                VertexAttribute {
                    name: "uv",
                    format: VertexFormat::Float32x2,
                    offset: 8,
                    location: 1,
                },
                VertexAttribute {
                    name: "color",
                    format: VertexFormat::Unorm8x4,
                    offset: 16,
                    location: 2,
                },
            ],
        }
    }
}

/// Four corners of a transformed sprite
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quad {
    pub top_left: SpriteVertex,
    pub bottom_left: SpriteVertex,
    pub top_right: SpriteVertex,
    pub bottom_right: SpriteVertex,
}

impl Quad {
    /// Vertices per quad in vertex mode
    pub const VERTEX_COUNT: u32 = 6;

    /// Index pattern over [`Quad::corners`] in index mode
    pub const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

    /// Two triangles: TL, BL, BR, BR, TR, TL
    pub fn triangles(&self) -> [SpriteVertex; 6] {
        [
            self.top_left,
            self.bottom_left,
            self.bottom_right,
            self.bottom_right,
            self.top_right,
            self.top_left,
        ]
    }

    /// Corners in index order: TL, BL, BR, TR
    pub fn corners(&self) -> [SpriteVertex; 4] {
        [
            self.top_left,
            self.bottom_left,
            self.bottom_right,
            self.top_right,
        ]
    }
}

/// One textured quad queued between `begin` and `end`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRequest {
    pub quad: Quad,
    pub page: TextureHandle,
    pub depth: f32,
}

/// A contiguous run of vertices (or indices, in index mode) sharing a page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderBatch {
    pub offset: u32,
    pub count: u32,
    pub page: TextureHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_matches_struct() {
        let layout = SpriteVertex::layout();
        assert_eq!(layout.stride, 20);
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 20);

        let end = layout
            .attributes
            .iter()
            .map(|a| a.offset + a.format.size())
            .max()
            .unwrap();
        assert_eq!(end, layout.stride);
    }

    #[test]
    fn test_quad_winding() {
        let corner = |x: f32, y: f32| SpriteVertex {
            position: [x, y],
            ..Default::default()
        };
        let quad = Quad {
            top_left: corner(0.0, 0.0),
            bottom_left: corner(0.0, 1.0),
            top_right: corner(1.0, 0.0),
            bottom_right: corner(1.0, 1.0),
        };

        let positions: Vec<[f32; 2]> = quad.triangles().iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]
        );

        // Indexed corners reproduce the same triangles
        let corners = quad.corners();
        let indexed: Vec<[f32; 2]> = Quad::INDICES
            .iter()
            .map(|&i| corners[i as usize].position)
            .collect();
        assert_eq!(indexed, positions);
    }

    #[test]
    fn test_vertex_bytes() {
        let vertex = SpriteVertex {
            position: [1.0, 2.0],
            uv: [0.5, 0.25],
            color: [255, 0, 0, 128],
        };
        let bytes = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[16..], &[255, 0, 0, 128]);
    }
}
