//! GPU program abstraction
//!
//! The batcher never talks to a graphics API directly. It drives a
//! [`GpuProgram`]: one shader plus its vertex/index buffers and uniforms.
//! [`WgpuProgram`](crate::renderer::WgpuProgram) is the real backend;
//! [`RecordingProgram`] records calls for tests and headless use.

use sprite2d_core::{Mat4, TextureHandle};
use thiserror::Error;

use crate::primitives::{SpriteVertex, VertexLayout};

/// Uniform carrying the batch transform
pub const PROJECTION_UNIFORM: &str = "u_projection";

/// Uniform carrying the page sampled by the current batch
pub const TEXTURE_UNIFORM: &str = "u_texture";

/// Error type for GPU program operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// Shader failed to parse or validate
    #[error("Shader compilation error: {0}")]
    Shader(String),

    /// The backend can't provide something the layout or shader needs
    #[error("Unsupported by backend: {0}")]
    Unsupported(String),

    /// Pixel data doesn't match the texture description
    #[error("Invalid texture data: {0}")]
    TextureData(String),

    /// Used before a successful `initialize`
    #[error("GPU program is not initialized")]
    NotInitialized,
}

/// Shader handed to [`GpuProgram::initialize`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderSource<'a> {
    pub label: &'a str,
    /// WGSL with `vs_main` and `fs_main` entry points
    pub wgsl: &'a str,
}

/// Expected update frequency of a buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once, drawn many times
    Static,
    /// Fully rewritten every frame
    Dynamic,
}

/// Primitive assembly for a draw
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Triangles,
}

/// Uniform values the batcher sets
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Texture(TextureHandle),
}

/// One shader program with its buffers
///
/// `draw` reads from the most recent uploads and uses the uniforms set before
/// it; a backend may defer the actual submission. When indices are bound,
/// `first` and `count` address the index buffer, otherwise the vertices.
pub trait GpuProgram {
    /// Compile the shader for `layout`. A failed program stays unusable.
    fn initialize(
        &mut self,
        layout: &VertexLayout,
        shader: &ShaderSource<'_>,
    ) -> Result<(), ProgramError>;

    /// Replace the vertex buffer contents
    fn upload_vertices(&mut self, bytes: &[u8], usage: BufferUsage);

    /// Replace the index buffer contents and switch to indexed drawing
    fn upload_indices(&mut self, indices: &[u32], usage: BufferUsage);

    /// Switch back to non-indexed drawing
    fn clear_indices(&mut self);

    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn draw(&mut self, kind: PrimitiveKind, first: u32, count: u32);
}

/// A call received by a [`RecordingProgram`]
#[derive(Clone, Debug, PartialEq)]
pub enum ProgramCall {
    Initialize { stride: u32, attributes: usize },
    UploadVertices { bytes: usize, usage: BufferUsage },
    UploadIndices { count: usize, usage: BufferUsage },
    ClearIndices,
    SetUniform { name: String, value: UniformValue },
    Draw { kind: PrimitiveKind, first: u32, count: u32 },
}

/// A [`GpuProgram`] that records every call instead of rendering
#[derive(Debug, Default)]
pub struct RecordingProgram {
    calls: Vec<ProgramCall>,
    vertex_bytes: Vec<u8>,
    indices: Vec<u32>,
    indexed: bool,
    fail_with: Option<ProgramError>,
}

impl RecordingProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// A program whose `initialize` always fails with `error`
    pub fn failing(error: ProgramError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    /// Get the recorded calls
    pub fn calls(&self) -> &[ProgramCall] {
        &self.calls
    }

    /// Take the recorded calls
    pub fn take_calls(&mut self) -> Vec<ProgramCall> {
        std::mem::take(&mut self.calls)
    }

    /// Clear recorded calls and buffer contents
    pub fn clear(&mut self) {
        self.calls.clear();
        self.vertex_bytes.clear();
        self.indices.clear();
        self.indexed = false;
    }

    /// Last uploaded vertex buffer, decoded
    pub fn vertices(&self) -> Vec<SpriteVertex> {
        self.vertex_bytes
            .chunks_exact(std::mem::size_of::<SpriteVertex>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    /// Last uploaded index buffer
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// `(first, count)` of every recorded draw, in order
    pub fn draws(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ProgramCall::Draw { first, count, .. } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    /// Values set for `name`, in order
    pub fn uniforms(&self, name: &str) -> Vec<UniformValue> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ProgramCall::SetUniform { name: n, value } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl GpuProgram for RecordingProgram {
    fn initialize(
        &mut self,
        layout: &VertexLayout,
        _shader: &ShaderSource<'_>,
    ) -> Result<(), ProgramError> {
        self.calls.push(ProgramCall::Initialize {
            stride: layout.stride,
            attributes: layout.attributes.len(),
        });
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn upload_vertices(&mut self, bytes: &[u8], usage: BufferUsage) {
        self.calls.push(ProgramCall::UploadVertices {
            bytes: bytes.len(),
            usage,
        });
        self.vertex_bytes.clear();
        self.vertex_bytes.extend_from_slice(bytes);
    }

    fn upload_indices(&mut self, indices: &[u32], usage: BufferUsage) {
        self.calls.push(ProgramCall::UploadIndices {
            count: indices.len(),
            usage,
        });
        self.indices.clear();
        self.indices.extend_from_slice(indices);
        self.indexed = true;
    }

    fn clear_indices(&mut self) {
        self.calls.push(ProgramCall::ClearIndices);
        self.indices.clear();
        self.indexed = false;
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.calls.push(ProgramCall::SetUniform {
            name: name.to_string(),
            value,
        });
    }

    fn draw(&mut self, kind: PrimitiveKind, first: u32, count: u32) {
        self.calls.push(ProgramCall::Draw { kind, first, count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_program_records_in_order() {
        let mut program = RecordingProgram::new();
        let shader = ShaderSource {
            label: "test",
            wgsl: "",
        };
        program
            .initialize(&SpriteVertex::layout(), &shader)
            .unwrap();

        let vertex = SpriteVertex {
            position: [3.0, 4.0],
            ..Default::default()
        };
        program.upload_vertices(bytemuck::bytes_of(&vertex), BufferUsage::Dynamic);
        program.set_uniform(PROJECTION_UNIFORM, UniformValue::Mat4(Mat4::IDENTITY));
        program.draw(PrimitiveKind::Triangles, 0, 1);

        assert_eq!(
            program.calls()[0],
            ProgramCall::Initialize {
                stride: 20,
                attributes: 3
            }
        );
        assert_eq!(program.vertices(), vec![vertex]);
        assert_eq!(program.draws(), vec![(0, 1)]);
        assert_eq!(
            program.uniforms(PROJECTION_UNIFORM),
            vec![UniformValue::Mat4(Mat4::IDENTITY)]
        );
    }

    #[test]
    fn test_vertices_decode_each_upload() {
        let mut program = RecordingProgram::new();
        let quad = [
            SpriteVertex {
                position: [1.0, 2.0],
                uv: [0.0, 0.5],
                color: [255, 0, 0, 255],
            },
            SpriteVertex {
                position: [3.0, 4.0],
                uv: [1.0, 0.5],
                color: [0, 255, 0, 128],
            },
        ];
        program.upload_vertices(bytemuck::cast_slice(&quad), BufferUsage::Dynamic);
        assert_eq!(program.vertices(), quad.to_vec());

        program.upload_vertices(bytemuck::bytes_of(&quad[1]), BufferUsage::Dynamic);
        assert_eq!(program.vertices(), vec![quad[1]]);
    }

    #[test]
    fn test_index_mode_toggles() {
        let mut program = RecordingProgram::new();
        program.upload_indices(&[0, 1, 2], BufferUsage::Dynamic);
        assert!(program.is_indexed());
        assert_eq!(program.indices(), &[0, 1, 2]);

        program.clear_indices();
        assert!(!program.is_indexed());
        assert!(program.indices().is_empty());
    }

    #[test]
    fn test_failing_program() {
        let mut program = RecordingProgram::failing(ProgramError::Shader("bad".into()));
        let shader = ShaderSource {
            label: "test",
            wgsl: "",
        };
        let err = program
            .initialize(&SpriteVertex::layout(), &shader)
            .unwrap_err();
        assert_eq!(err, ProgramError::Shader("bad".into()));
    }
}
