//! sprite2d GPU Batching
//!
//! Turns per-frame sprite, atlas frame, and text draws into as few GPU draw
//! calls as the chosen ordering allows.
//!
//! # Features
//!
//! - **Compositor**: `SpriteBatch` with begin/draw/end, pixel-snapped quads,
//!   anchor/scale/rotation, atlas trim and rotation correction
//! - **Sorting**: submission order, depth either way, or by texture page
//! - **Batching**: greedy merge of same-page runs, index mode for large frames
//! - **Backends**: `WgpuProgram` on wgpu, `RecordingProgram` for tests

pub mod batch;
pub mod config;
pub mod primitives;
pub mod program;
pub mod renderer;
pub mod shaders;

pub use batch::{BatchError, BatchState, DrawParams, Result, SpriteBatch};
pub use config::{BatchConfig, SortOrder};
pub use primitives::{
    DrawRequest, Quad, RenderBatch, SpriteVertex, VertexAttribute, VertexFormat, VertexLayout,
};
pub use program::{
    BufferUsage, GpuProgram, PrimitiveKind, ProgramCall, ProgramError, RecordingProgram,
    ShaderSource, UniformValue, PROJECTION_UNIFORM, TEXTURE_UNIFORM,
};
pub use renderer::WgpuProgram;
pub use shaders::SPRITE_SHADER;
