//! wgpu backend
//!
//! [`WgpuProgram`] implements [`GpuProgram`] on a caller-provided device and
//! queue. Uploads, projections and draws are staged on the CPU and replayed
//! in a single render pass by [`WgpuProgram::flush`]. Every upload appends to
//! the staging buffers, so several begin/end cycles may run before one flush;
//! each draw keeps the vertex, index and projection bases of its own cycle.

use std::num::NonZeroU64;
use std::ops::Range;
use std::sync::Arc;

use sprite2d_core::{Color, Mat4, TextureHandle, TextureRegistry};

use crate::primitives::{VertexFormat, VertexLayout};
use crate::program::{
    BufferUsage, GpuProgram, PrimitiveKind, ProgramError, ShaderSource, UniformValue,
    PROJECTION_UNIFORM, TEXTURE_UNIFORM,
};

/// Initial size of the vertex and index buffers
const MIN_BUFFER_SIZE: u64 = 16 * 1024;

/// Bytes of one projection matrix
const PROJECTION_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// GPU resources for one registered page
struct PageBinding {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// A draw resolved against the staging buffers
#[derive(Clone, Debug, PartialEq)]
struct DrawCall {
    page: TextureHandle,
    /// Index into the staged projections
    projection: usize,
    /// Vertex range, or index range when `base_vertex` is set
    range: Range<u32>,
    base_vertex: Option<i32>,
}

/// Everything recorded since the last flush
#[derive(Debug, Default)]
struct PendingFrame {
    stride: u32,
    vertex_bytes: Vec<u8>,
    indices: Vec<u32>,
    projections: Vec<Mat4>,
    draws: Vec<DrawCall>,
    vertex_base: u32,
    index_base: u32,
    indexed: bool,
    projection: Option<usize>,
    page: Option<TextureHandle>,
}

impl PendingFrame {
    fn upload_vertices(&mut self, bytes: &[u8]) {
        if self.stride == 0 {
            tracing::warn!("vertex upload ignored: {}", ProgramError::NotInitialized);
            return;
        }
        self.vertex_base = (self.vertex_bytes.len() / self.stride as usize) as u32;
        self.vertex_bytes.extend_from_slice(bytes);
    }

    fn upload_indices(&mut self, indices: &[u32]) {
        self.index_base = self.indices.len() as u32;
        self.indices.extend_from_slice(indices);
        self.indexed = true;
    }

    fn set_projection(&mut self, matrix: Mat4) {
        self.projections.push(matrix);
        self.projection = Some(self.projections.len() - 1);
    }

    /// Record a draw against the latest uploads; `false` if no page is bound
    fn draw(&mut self, first: u32, count: u32) -> bool {
        let Some(page) = self.page else {
            return false;
        };
        let projection = match self.projection {
            Some(index) => index,
            None => {
                self.set_projection(Mat4::IDENTITY);
                self.projections.len() - 1
            }
        };

        let (range, base_vertex) = if self.indexed {
            let start = self.index_base + first;
            (start..start + count, Some(self.vertex_base as i32))
        } else {
            let start = self.vertex_base + first;
            (start..start + count, None)
        };

        self.draws.push(DrawCall {
            page,
            projection,
            range,
            base_vertex,
        });
        true
    }

    /// Take the staged contents, keeping the stride
    fn take(&mut self) -> PendingFrame {
        let stride = self.stride;
        let frame = std::mem::take(self);
        self.stride = stride;
        frame
    }
}

/// Grow-on-demand GPU buffer
struct DynamicBuffer {
    buffer: Option<wgpu::Buffer>,
    usage: wgpu::BufferUsages,
    label: &'static str,
}

impl DynamicBuffer {
    fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            buffer: None,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            label,
        }
    }

    /// Write `bytes` at offset zero; `true` if the buffer was reallocated
    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) -> bool {
        let size = bytes.len() as u64;
        let needs_new = match &self.buffer {
            Some(buf) => buf.size() < size,
            None => true,
        };

        if needs_new {
            let capacity = size.next_power_of_two().max(MIN_BUFFER_SIZE);
            tracing::debug!(buffer = self.label, capacity, "allocating GPU buffer");
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: capacity,
                usage: self.usage,
                mapped_at_creation: false,
            }));
        }

        if let Some(buf) = &self.buffer {
            queue.write_buffer(buf, 0, bytes);
        }
        needs_new
    }
}

/// [`GpuProgram`] backed by wgpu
pub struct WgpuProgram {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    pipeline: Option<wgpu::RenderPipeline>,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    /// Stride between projections in the uniform buffer
    uniform_align: u64,
    uniforms: DynamicBuffer,
    uniform_bind_group: Option<wgpu::BindGroup>,
    sampler: wgpu::Sampler,
    pages: TextureRegistry<PageBinding>,
    vertices: DynamicBuffer,
    indices: DynamicBuffer,
    pending: PendingFrame,
}

impl WgpuProgram {
    /// Create a program rendering into targets of `format`
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(PROJECTION_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Page Bind Group Layout"),
            entries: &[
                // Page texture
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Page sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let uniform_align = (device.limits().min_uniform_buffer_offset_alignment as u64)
            .max(PROJECTION_SIZE);

        // Nearest filtering keeps pixel art and bitmap glyphs sharp
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Page Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device,
            queue,
            format,
            pipeline: None,
            uniform_layout,
            texture_layout,
            uniform_align,
            uniforms: DynamicBuffer::new("Sprite Uniforms Buffer", wgpu::BufferUsages::UNIFORM),
            uniform_bind_group: None,
            sampler,
            pages: TextureRegistry::default(),
            vertices: DynamicBuffer::new("Sprite Vertex Buffer", wgpu::BufferUsages::VERTEX),
            indices: DynamicBuffer::new("Sprite Index Buffer", wgpu::BufferUsages::INDEX),
            pending: PendingFrame::default(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn texture_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Upload an RGBA8 image as a new texture page
    pub fn create_texture_rgba8(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle, ProgramError> {
        let expected = 4 * width as usize * height as usize;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(ProgramError::TextureData(format!(
                "{width}x{height} RGBA8 page needs {expected} bytes, got {}",
                pixels.len()
            )));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Sprite Page Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        Ok(self.register_texture(texture))
    }

    /// A 1x1 opaque white page, for `SpriteBatch::set_pixel_texture`
    pub fn create_pixel_texture(&mut self) -> Result<TextureHandle, ProgramError> {
        self.create_texture_rgba8(1, 1, &[255, 255, 255, 255])
    }

    /// Register an existing texture as a page
    pub fn register_texture(&mut self, texture: wgpu::Texture) -> TextureHandle {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Page Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let (width, height) = (texture.width(), texture.height());
        self.pages
            .insert(width, height, PageBinding { texture, bind_group })
    }

    /// Drop a page's GPU resources
    pub fn remove_texture(&mut self, page: TextureHandle) -> bool {
        self.pages.remove(page).is_some()
    }

    /// Draws recorded since the last flush
    pub fn pending_draws(&self) -> usize {
        self.pending.draws.len()
    }

    /// Replay recorded draws into `target` in one render pass and submit.
    ///
    /// `clear` clears the target first; `None` draws over its contents.
    pub fn flush(&mut self, target: &wgpu::TextureView, clear: Option<Color>) -> Result<(), ProgramError> {
        if self.pipeline.is_none() {
            return Err(ProgramError::NotInitialized);
        }
        let frame = self.pending.take();
        self.upload(&frame);

        let load = match clear {
            Some(color) => {
                let [r, g, b, a] = color.to_f32_array();
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: a as f64,
                })
            }
            None => wgpu::LoadOp::Load,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Sprite Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let (Some(pipeline), Some(vertices), Some(uniforms)) = (
                &self.pipeline,
                &self.vertices.buffer,
                &self.uniform_bind_group,
            ) {
                if !frame.draws.is_empty() {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_vertex_buffer(0, vertices.slice(..));
                    match &self.indices.buffer {
                        Some(indices) if !frame.indices.is_empty() => render_pass
                            .set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32),
                        _ => {}
                    }
                }

                let mut bound_projection = None;
                for draw in &frame.draws {
                    let Some(page) = self.pages.get(draw.page) else {
                        tracing::warn!(page = draw.page.id().to_raw(), "skipping draw for unregistered page");
                        continue;
                    };

                    if bound_projection != Some(draw.projection) {
                        let offset = draw.projection as u64 * self.uniform_align;
                        render_pass.set_bind_group(0, uniforms, &[offset as u32]);
                        bound_projection = Some(draw.projection);
                    }
                    render_pass.set_bind_group(1, &page.bind_group, &[]);

                    match draw.base_vertex {
                        Some(base_vertex) => {
                            render_pass.draw_indexed(draw.range.clone(), base_vertex, 0..1)
                        }
                        None => render_pass.draw(draw.range.clone(), 0..1),
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        tracing::debug!(
            draws = frame.draws.len(),
            projections = frame.projections.len(),
            "sprite pass submitted"
        );
        Ok(())
    }

    /// Write staged vertices, indices and projections to the GPU
    fn upload(&mut self, frame: &PendingFrame) {
        if !frame.vertex_bytes.is_empty() {
            self.vertices.write(&self.device, &self.queue, &frame.vertex_bytes);
        }
        if !frame.indices.is_empty() {
            self.indices
                .write(&self.device, &self.queue, bytemuck::cast_slice(&frame.indices));
        }

        let mut projections = vec![0u8; frame.projections.len().max(1) * self.uniform_align as usize];
        for (i, matrix) in frame.projections.iter().enumerate() {
            let start = i * self.uniform_align as usize;
            projections[start..start + PROJECTION_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&matrix.to_cols_array()));
        }

        let reallocated = self.uniforms.write(&self.device, &self.queue, &projections);
        if reallocated || self.uniform_bind_group.is_none() {
            if let Some(buffer) = &self.uniforms.buffer {
                self.uniform_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Sprite Uniform Bind Group"),
                    layout: &self.uniform_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer,
                            offset: 0,
                            size: NonZeroU64::new(PROJECTION_SIZE),
                        }),
                    }],
                }));
            }
        }
    }

    fn validate(shader: &ShaderSource<'_>) -> Result<(), ProgramError> {
        let module = naga::front::wgsl::parse_str(shader.wgsl)
            .map_err(|e| ProgramError::Shader(e.emit_to_string(shader.wgsl)))?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| ProgramError::Shader(e.as_inner().to_string()))?;

        for entry in ["vs_main", "fs_main"] {
            if !module.entry_points.iter().any(|e| e.name == entry) {
                return Err(ProgramError::Shader(format!(
                    "missing entry point `{entry}` in {}",
                    shader.label
                )));
            }
        }
        Ok(())
    }
}

fn vertex_format(format: VertexFormat) -> wgpu::VertexFormat {
    match format {
        VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        VertexFormat::Unorm8x4 => wgpu::VertexFormat::Unorm8x4,
    }
}

impl GpuProgram for WgpuProgram {
    fn initialize(
        &mut self,
        layout: &VertexLayout,
        shader: &ShaderSource<'_>,
    ) -> Result<(), ProgramError> {
        Self::validate(shader)?;

        let limits = self.device.limits();
        if layout.attributes.len() as u32 > limits.max_vertex_attributes {
            return Err(ProgramError::Unsupported(format!(
                "{} vertex attributes, device allows {}",
                layout.attributes.len(),
                limits.max_vertex_attributes
            )));
        }
        if layout.stride > limits.max_vertex_buffer_array_stride {
            return Err(ProgramError::Unsupported(format!(
                "vertex stride {}, device allows {}",
                layout.stride, limits.max_vertex_buffer_array_stride
            )));
        }

        let attributes: Vec<wgpu::VertexAttribute> = layout
            .attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: vertex_format(a.format),
                offset: a.offset as u64,
                shader_location: a.location,
            })
            .collect();

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(shader.label),
                source: wgpu::ShaderSource::Wgsl(shader.wgsl.into()),
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Sprite Pipeline Layout"),
                bind_group_layouts: &[&self.uniform_layout, &self.texture_layout],
                push_constant_ranges: &[],
            });

        let blend_state = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Sprite Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: layout.stride as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: Some(blend_state),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        tracing::debug!(label = shader.label, stride = layout.stride, "sprite pipeline created");
        self.pipeline = Some(pipeline);
        self.pending.stride = layout.stride;
        Ok(())
    }

    fn upload_vertices(&mut self, bytes: &[u8], usage: BufferUsage) {
        tracing::trace!(bytes = bytes.len(), ?usage, "staging vertices");
        self.pending.upload_vertices(bytes);
    }

    fn upload_indices(&mut self, indices: &[u32], usage: BufferUsage) {
        tracing::trace!(count = indices.len(), ?usage, "staging indices");
        self.pending.upload_indices(indices);
    }

    fn clear_indices(&mut self) {
        self.pending.indexed = false;
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match (name, value) {
            (PROJECTION_UNIFORM, UniformValue::Mat4(matrix)) => self.pending.set_projection(matrix),
            (TEXTURE_UNIFORM, UniformValue::Texture(page)) => self.pending.page = Some(page),
            _ => tracing::warn!(name, ?value, "ignoring unsupported uniform"),
        }
    }

    // The pipeline topology is a triangle list
    fn draw(&mut self, _kind: PrimitiveKind, first: u32, count: u32) {
        if self.pipeline.is_none() {
            tracing::warn!("draw ignored: {}", ProgramError::NotInitialized);
            return;
        }
        if !self.pending.draw(first, count) {
            tracing::warn!("draw ignored: no page texture bound");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(stride: u32) -> PendingFrame {
        PendingFrame {
            stride,
            ..PendingFrame::default()
        }
    }

    #[test]
    fn test_cycles_before_flush_keep_their_bases() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(16, 16);
        let world = Mat4::translation(5.0, 0.0);
        let ui = Mat4::screen(320.0, 240.0);
        let mut pending = staged(20);

        // First cycle: two quads, vertex mode
        pending.upload_vertices(&[0u8; 240]);
        pending.set_projection(world);
        pending.page = Some(page);
        assert!(pending.draw(0, 12));

        // Second cycle with its own vertices and transform
        pending.upload_vertices(&[0u8; 120]);
        pending.set_projection(ui);
        pending.page = Some(page);
        assert!(pending.draw(0, 6));

        assert_eq!(pending.vertex_bytes.len(), 360);
        assert_eq!(pending.projections, vec![world, ui]);
        assert_eq!(pending.draws[0].range, 0..12);
        assert_eq!(pending.draws[0].projection, 0);
        assert_eq!(pending.draws[1].range, 12..18);
        assert_eq!(pending.draws[1].projection, 1);
        assert_eq!(pending.draws[1].base_vertex, None);
    }

    #[test]
    fn test_indexed_cycle_offsets_into_shared_buffers() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(16, 16);
        let mut pending = staged(20);

        pending.upload_vertices(&[0u8; 80]);
        pending.upload_indices(&[0, 1, 2, 2, 3, 0]);
        pending.set_projection(Mat4::IDENTITY);
        pending.page = Some(page);
        pending.draw(0, 6);

        pending.upload_vertices(&[0u8; 160]);
        pending.upload_indices(&[0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
        pending.draw(6, 6);

        assert_eq!(pending.draws[0].range, 0..6);
        assert_eq!(pending.draws[0].base_vertex, Some(0));
        // Second cycle's indices are relative to its own four-vertex base
        assert_eq!(pending.draws[1].range, 12..18);
        assert_eq!(pending.draws[1].base_vertex, Some(4));

        pending.indexed = false;
        pending.upload_vertices(&[0u8; 120]);
        pending.draw(0, 6);
        assert_eq!(pending.draws[2].range, 12..18);
        assert_eq!(pending.draws[2].base_vertex, None);
    }

    #[test]
    fn test_take_resets_staging() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(16, 16);
        let mut pending = staged(20);

        assert!(!pending.draw(0, 6));

        pending.upload_vertices(&[0u8; 120]);
        pending.page = Some(page);
        assert!(pending.draw(0, 6));
        // No projection set: the identity is staged
        assert_eq!(pending.projections, vec![Mat4::IDENTITY]);

        let frame = pending.take();
        assert_eq!(frame.draws.len(), 1);
        assert!(pending.draws.is_empty());
        assert!(pending.vertex_bytes.is_empty());
        assert_eq!(pending.stride, 20);

        pending.upload_vertices(&[0u8; 120]);
        pending.page = Some(page);
        pending.draw(0, 6);
        assert_eq!(pending.draws[0].range, 0..6);
    }

    #[test]
    fn test_upload_before_initialize_is_ignored() {
        let mut pending = PendingFrame::default();
        pending.upload_vertices(&[0u8; 120]);
        assert!(pending.vertex_bytes.is_empty());
    }
}
