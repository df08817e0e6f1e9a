//! GPU shaders for sprite batching

/// Textured, tinted sprite shader
///
/// Bind group 0 holds the projection matrix; bind group 1 holds the page
/// texture and sampler of the batch being drawn. UVs arrive normalized.
pub const SPRITE_SHADER: &str = r#"
// ============================================================================
// sprite2d Sprite Shader
// ============================================================================

struct Uniforms {
    projection: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(1) @binding(0) var page_texture: texture_2d<f32>;
@group(1) @binding(1) var page_sampler: sampler;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = uniforms.projection * vec4<f32>(input.position, 0.0, 1.0);
    out.uv = input.uv;
    out.color = input.color;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(page_texture, page_sampler, input.uv) * input.color;
}
"#;
