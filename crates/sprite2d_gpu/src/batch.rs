//! Sprite batch compositor
//!
//! Accumulates textured quads between `begin` and `end`, then sorts them,
//! merges runs that share a texture page into batches, uploads one vertex
//! stream and issues one draw per batch.
//!
//! # Example
//!
//! ```rust
//! use sprite2d_core::{IntRect, Mat4, TextureRegistry, Vec2};
//! use sprite2d_gpu::{DrawParams, RecordingProgram, SortOrder, SpriteBatch};
//!
//! let mut textures = TextureRegistry::new();
//! let page = textures.register(64, 64);
//!
//! let mut batch = SpriteBatch::new(RecordingProgram::new());
//! batch.init().unwrap();
//!
//! batch.begin(Mat4::screen(640.0, 480.0), SortOrder::Texture).unwrap();
//! batch
//!     .draw_texture(page, IntRect::new(0, 0, 16, 16), Vec2::new(10.0, 10.0), DrawParams::default())
//!     .unwrap();
//! batch.end().unwrap();
//!
//! assert_eq!(batch.batches().len(), 1);
//! ```

use smallvec::SmallVec;
use sprite2d_core::{Color, Frame, IntRect, Mat4, Rect, TextureHandle, Vec2};
use sprite2d_text::{FontText, ProjectedGlyph};
use thiserror::Error;

use crate::config::{BatchConfig, SortOrder};
use crate::primitives::{DrawRequest, Quad, RenderBatch, SpriteVertex};
use crate::program::{
    BufferUsage, GpuProgram, PrimitiveKind, ProgramError, ShaderSource, UniformValue,
    PROJECTION_UNIFORM, TEXTURE_UNIFORM,
};
use crate::shaders::SPRITE_SHADER;

/// Misuse of the begin/draw/end protocol, or a failed initialization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Sprite batch used before a successful init()")]
    Uninitialized,

    #[error("begin() called while a batch is already in progress")]
    AlreadyStarted,

    #[error("Draw or end() called without a matching begin()")]
    NotStarted,

    #[error("Texture page has zero size")]
    InvalidTexture,

    #[error("draw_rectangle() needs a pixel texture; call set_pixel_texture() first")]
    MissingPixelTexture,

    #[error(transparent)]
    Program(#[from] ProgramError),
}

pub type Result<T> = std::result::Result<T, BatchError>;

/// Lifecycle of a [`SpriteBatch`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Uninitialized,
    Idle,
    Accumulating,
}

/// Per-draw placement and tint
///
/// `anchor` is the rotation/placement origin in unscaled source pixels; the
/// sprite is drawn so that its anchor lands on the draw position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    pub tint: Color,
    pub scale: Vec2,
    pub anchor: Vec2,
    /// Radians, clockwise on a y-down screen
    pub rotation: f32,
    /// Sort key for the depth policies
    pub depth: f32,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            tint: Color::WHITE,
            scale: Vec2::ONE,
            anchor: Vec2::ZERO,
            rotation: 0.0,
            depth: 0.0,
        }
    }
}

impl DrawParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }
}

/// Sprite batcher driving a [`GpuProgram`]
pub struct SpriteBatch<P: GpuProgram> {
    program: P,
    config: BatchConfig,
    state: BatchState,
    transform: Mat4,
    sort_order: SortOrder,
    requests: Vec<DrawRequest>,
    vertices: Vec<SpriteVertex>,
    indices: Vec<u32>,
    batches: SmallVec<[RenderBatch; 16]>,
    pixel: Option<TextureHandle>,
    /// Whether the program currently has indices bound
    indexed: bool,
}

impl<P: GpuProgram> SpriteBatch<P> {
    pub fn new(program: P) -> Self {
        Self::with_config(program, BatchConfig::default())
    }

    pub fn with_config(program: P, config: BatchConfig) -> Self {
        Self {
            program,
            sort_order: config.sort_order,
            config,
            state: BatchState::Uninitialized,
            transform: Mat4::IDENTITY,
            requests: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            batches: SmallVec::new(),
            pixel: None,
            indexed: false,
        }
    }

    /// Build the GPU program. On failure the batch stays uninitialized and
    /// every later call reports [`BatchError::Uninitialized`].
    pub fn init(&mut self) -> Result<()> {
        if self.state != BatchState::Uninitialized {
            tracing::debug!("sprite batch already initialized");
            return Ok(());
        }

        let shader = ShaderSource {
            label: "Sprite Shader",
            wgsl: SPRITE_SHADER,
        };
        if let Err(err) = self.program.initialize(&SpriteVertex::layout(), &shader) {
            tracing::error!(%err, "failed to initialize sprite batch program");
            return Err(err.into());
        }

        self.requests.reserve(self.config.initial_capacity);
        self.state = BatchState::Idle;
        tracing::debug!("sprite batch initialized");
        Ok(())
    }

    /// Start a frame. Clears the previous frame's requests and batches.
    pub fn begin(&mut self, transform: Mat4, sort_order: SortOrder) -> Result<()> {
        match self.state {
            BatchState::Uninitialized => return Err(self.fail(BatchError::Uninitialized)),
            BatchState::Accumulating => return Err(self.fail(BatchError::AlreadyStarted)),
            BatchState::Idle => {}
        }

        self.transform = transform;
        self.sort_order = sort_order;
        self.requests.clear();
        self.batches.clear();
        self.state = BatchState::Accumulating;
        Ok(())
    }

    /// Start a frame with the configured sort policy
    pub fn begin_default(&mut self, transform: Mat4) -> Result<()> {
        self.begin(transform, self.config.sort_order)
    }

    /// Queue a sub-rectangle of `texture`.
    ///
    /// The destination is snapped to whole pixels: position and scaled size
    /// are rounded. Corners are rotated about the scaled anchor.
    pub fn draw_texture(
        &mut self,
        texture: TextureHandle,
        source: IntRect,
        position: Vec2,
        params: DrawParams,
    ) -> Result<()> {
        self.ensure_accumulating()?;
        if !texture.is_valid() {
            return Err(self.fail(BatchError::InvalidTexture));
        }

        self.push_request(texture, Rect::from(source), position, params);
        Ok(())
    }

    /// Queue a whole texture
    pub fn draw_texture_full(
        &mut self,
        texture: TextureHandle,
        position: Vec2,
        params: DrawParams,
    ) -> Result<()> {
        let source = IntRect::new(0, 0, texture.width() as i32, texture.height() as i32);
        self.draw_texture(texture, source, position, params)
    }

    /// Queue `source` stretched onto `destination`.
    ///
    /// The scale is derived from the two rectangles and replaces
    /// `params.scale`. A zero-area source queues nothing.
    pub fn draw_texture_to(
        &mut self,
        texture: TextureHandle,
        source: IntRect,
        destination: Rect,
        params: DrawParams,
    ) -> Result<()> {
        self.ensure_accumulating()?;
        if source.w == 0 || source.h == 0 {
            return Ok(());
        }

        let scale = Vec2::new(
            destination.width / source.w as f32,
            destination.height / source.h as f32,
        );
        self.draw_texture(
            texture,
            source,
            destination.origin(),
            DrawParams { scale, ..params },
        )
    }

    /// Queue an atlas frame, correcting for packer trim and rotation.
    ///
    /// `params.anchor` is in the frame's logical, untrimmed box.
    pub fn draw_frame(
        &mut self,
        frame: &Frame,
        position: Vec2,
        params: DrawParams,
    ) -> Result<()> {
        let resolved = frame.resolve(params.anchor, params.scale, params.rotation);
        self.draw_texture(
            resolved.page,
            resolved.source,
            position,
            DrawParams {
                anchor: resolved.anchor,
                scale: resolved.scale,
                rotation: resolved.rotation,
                ..params
            },
        )
    }

    /// Queue laid out glyphs as one block placed at `position`.
    ///
    /// Scale, anchor and rotation apply to the block as a whole; glyphs with
    /// nothing to sample (spaces) produce no quad.
    pub fn draw_glyphs(
        &mut self,
        glyphs: &[ProjectedGlyph],
        position: Vec2,
        params: DrawParams,
    ) -> Result<()> {
        self.ensure_accumulating()?;

        let queued = self.requests.len();
        let anchor = params.anchor.scale(params.scale);
        for glyph in glyphs {
            if glyph.frame.is_empty() {
                continue;
            }

            let offset = (Vec2::from(glyph.destination).scale(params.scale) - anchor)
                .rotate(params.rotation);
            let placed = self.draw_frame(
                &glyph.frame,
                position + offset,
                DrawParams {
                    anchor: Vec2::ZERO,
                    ..params
                },
            );
            if let Err(err) = placed {
                // All or nothing
                self.requests.truncate(queued);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Queue the revealed part of `text` (its first `progress` glyphs)
    pub fn draw_text(
        &mut self,
        text: &FontText,
        position: Vec2,
        params: DrawParams,
    ) -> Result<()> {
        self.draw_glyphs(text.visible_glyphs(), position, params)
    }

    /// Page used by [`SpriteBatch::draw_rectangle`]; its top-left texel
    /// should be opaque white
    pub fn set_pixel_texture(&mut self, texture: TextureHandle) {
        self.pixel = Some(texture);
    }

    pub fn pixel_texture(&self) -> Option<TextureHandle> {
        self.pixel
    }

    /// Queue a solid rectangle.
    ///
    /// `params.anchor` is in unscaled rectangle pixels. Empty rectangles
    /// queue nothing.
    pub fn draw_rectangle(&mut self, rect: Rect, params: DrawParams) -> Result<()> {
        self.ensure_accumulating()?;
        let Some(pixel) = self.pixel else {
            return Err(self.fail(BatchError::MissingPixelTexture));
        };
        if rect.width == 0.0 || rect.height == 0.0 {
            return Ok(());
        }

        self.draw_texture(
            pixel,
            IntRect::new(0, 0, 1, 1),
            rect.origin(),
            DrawParams {
                scale: Vec2::new(rect.width, rect.height).scale(params.scale),
                anchor: Vec2::new(params.anchor.x / rect.width, params.anchor.y / rect.height),
                ..params
            },
        )
    }

    /// Sort, merge, upload and draw everything queued since `begin`
    pub fn end(&mut self) -> Result<()> {
        self.ensure_accumulating()?;

        self.sort_requests();
        self.build_batches();
        self.render_batches();

        tracing::debug!(
            requests = self.requests.len(),
            batches = self.batches.len(),
            indexed = self.indexed,
            "sprite batch flushed"
        );

        self.state = BatchState::Idle;
        Ok(())
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state != BatchState::Uninitialized
    }

    /// True between `begin` and `end`
    pub fn is_drawing(&self) -> bool {
        self.state == BatchState::Accumulating
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// Requests queued this frame (sorted once `end` ran)
    pub fn requests(&self) -> &[DrawRequest] {
        &self.requests
    }

    /// Batches built by the last `end`
    pub fn batches(&self) -> &[RenderBatch] {
        &self.batches
    }

    /// Vertex stream uploaded by the last `end`
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    /// Index stream uploaded by the last `end`; empty in vertex mode
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut P {
        &mut self.program
    }

    pub fn into_program(self) -> P {
        self.program
    }

    fn fail(&self, err: BatchError) -> BatchError {
        tracing::error!(%err, state = ?self.state, "sprite batch misuse");
        err
    }

    fn ensure_accumulating(&self) -> Result<()> {
        match self.state {
            BatchState::Accumulating => Ok(()),
            BatchState::Uninitialized => Err(self.fail(BatchError::Uninitialized)),
            BatchState::Idle => Err(self.fail(BatchError::NotStarted)),
        }
    }

    fn push_request(&mut self, texture: TextureHandle, source: Rect, position: Vec2, params: DrawParams) {
        let anchor = params.anchor.scale(params.scale);

        // Snap to the pixel grid to avoid shimmer
        let origin = position.round();
        let size = Vec2::new(
            (source.width * params.scale.x).round(),
            (source.height * params.scale.y).round(),
        );

        let corner = |x: f32, y: f32| (Vec2::new(x, y) - anchor).rotate(params.rotation) + origin;

        let inv_w = 1.0 / texture.width() as f32;
        let inv_h = 1.0 / texture.height() as f32;
        let u0 = source.x * inv_w;
        let v0 = source.y * inv_h;
        let u1 = (source.x + source.width) * inv_w;
        let v1 = (source.y + source.height) * inv_h;

        let color = params.tint.to_array();
        let vertex = |position: Vec2, uv: [f32; 2]| SpriteVertex {
            position: position.to_array(),
            uv,
            color,
        };

        let quad = Quad {
            top_left: vertex(corner(0.0, 0.0), [u0, v0]),
            bottom_left: vertex(corner(0.0, size.y), [u0, v1]),
            top_right: vertex(corner(size.x, 0.0), [u1, v0]),
            bottom_right: vertex(corner(size.x, size.y), [u1, v1]),
        };

        tracing::trace!(
            page = texture.id().to_raw(),
            x = origin.x,
            y = origin.y,
            depth = params.depth,
            "queued sprite"
        );

        self.requests.push(DrawRequest {
            quad,
            page: texture,
            depth: params.depth,
        });
    }

    fn sort_requests(&mut self) {
        match self.sort_order {
            SortOrder::None => {}
            SortOrder::FrontToBack => self
                .requests
                .sort_by(|a, b| a.depth.total_cmp(&b.depth)),
            SortOrder::BackToFront => self
                .requests
                .sort_by(|a, b| b.depth.total_cmp(&a.depth)),
            SortOrder::Texture => self.requests.sort_by_key(|r| r.page),
        }
    }

    /// Greedy merge: a new batch starts whenever the page changes
    fn build_batches(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();

        if self.requests.is_empty() {
            return;
        }

        let indexed = self.requests.len() > self.config.index_threshold;
        let step = Quad::INDICES.len() as u32;
        let mut offset = 0u32;

        if indexed {
            self.vertices.reserve(self.requests.len() * 4);
            self.indices.reserve(self.requests.len() * Quad::INDICES.len());
        } else {
            self.vertices
                .reserve(self.requests.len() * Quad::VERTEX_COUNT as usize);
        }

        for request in &self.requests {
            match self.batches.last_mut() {
                Some(batch) if batch.page == request.page => batch.count += step,
                _ => self.batches.push(RenderBatch {
                    offset,
                    count: step,
                    page: request.page,
                }),
            }

            if indexed {
                let base = self.vertices.len() as u32;
                self.vertices.extend_from_slice(&request.quad.corners());
                self.indices
                    .extend(Quad::INDICES.iter().map(|i| base + i));
            } else {
                self.vertices.extend_from_slice(&request.quad.triangles());
            }
            offset += step;
        }

        self.program
            .upload_vertices(bytemuck::cast_slice(&self.vertices), BufferUsage::Dynamic);

        if indexed {
            self.program
                .upload_indices(&self.indices, BufferUsage::Dynamic);
        } else if self.indexed {
            self.program.clear_indices();
        }
        self.indexed = indexed;
    }

    fn render_batches(&mut self) {
        if self.batches.is_empty() {
            return;
        }

        self.program
            .set_uniform(PROJECTION_UNIFORM, UniformValue::Mat4(self.transform));

        for batch in &self.batches {
            self.program
                .set_uniform(TEXTURE_UNIFORM, UniformValue::Texture(batch.page));
            self.program
                .draw(PrimitiveKind::Triangles, batch.offset, batch.count);
        }
    }
}

impl<P: GpuProgram + std::fmt::Debug> std::fmt::Debug for SpriteBatch<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteBatch")
            .field("program", &self.program)
            .field("state", &self.state)
            .field("sort_order", &self.sort_order)
            .field("requests", &self.requests.len())
            .field("batches", &self.batches.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ProgramCall, RecordingProgram};
    use sprite2d_core::{IVec2, TextureRegistry};

    fn ready_batch() -> SpriteBatch<RecordingProgram> {
        let mut batch = SpriteBatch::new(RecordingProgram::new());
        batch.init().unwrap();
        batch
    }

    fn positions(quad: &Quad) -> [[f32; 2]; 4] {
        [
            quad.top_left.position,
            quad.bottom_left.position,
            quad.top_right.position,
            quad.bottom_right.position,
        ]
    }

    #[test]
    fn test_state_machine() {
        let mut batch = SpriteBatch::new(RecordingProgram::new());
        assert_eq!(
            batch.begin(Mat4::IDENTITY, SortOrder::None),
            Err(BatchError::Uninitialized)
        );

        batch.init().unwrap();
        assert_eq!(batch.state(), BatchState::Idle);
        assert_eq!(batch.end(), Err(BatchError::NotStarted));

        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();
        assert_eq!(
            batch.begin(Mat4::IDENTITY, SortOrder::None),
            Err(BatchError::AlreadyStarted)
        );
        assert!(batch.is_drawing());

        batch.end().unwrap();
        assert_eq!(batch.state(), BatchState::Idle);
    }

    #[test]
    fn test_failed_init_leaves_batch_unusable() {
        let mut batch =
            SpriteBatch::new(RecordingProgram::failing(ProgramError::Shader("oops".into())));
        assert_eq!(
            batch.init(),
            Err(BatchError::Program(ProgramError::Shader("oops".into())))
        );
        assert!(!batch.is_initialized());
        assert_eq!(
            batch.begin(Mat4::IDENTITY, SortOrder::None),
            Err(BatchError::Uninitialized)
        );
    }

    #[test]
    fn test_draw_outside_begin_is_rejected() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(8, 8);
        let mut batch = ready_batch();
        let err = batch
            .draw_texture(page, IntRect::new(0, 0, 8, 8), Vec2::ZERO, DrawParams::default())
            .unwrap_err();
        assert_eq!(err, BatchError::NotStarted);
        assert!(batch.requests().is_empty());
    }

    #[test]
    fn test_zero_sized_texture_is_rejected() {
        let mut textures = TextureRegistry::new();
        let empty = textures.register(0, 0);
        let mut batch = ready_batch();
        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();
        assert_eq!(
            batch.draw_texture_full(empty, Vec2::ZERO, DrawParams::default()),
            Err(BatchError::InvalidTexture)
        );
        assert!(batch.is_drawing());
    }

    #[test]
    fn test_quad_geometry_and_uvs() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(64, 32);
        let mut batch = ready_batch();
        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();
        batch
            .draw_texture(
                page,
                IntRect::new(16, 8, 16, 8),
                Vec2::new(10.4, 20.6),
                DrawParams::default()
                    .with_scale(Vec2::new(2.0, 2.0))
                    .with_anchor(Vec2::new(8.0, 4.0))
                    .with_tint(Color::RED),
            )
            .unwrap();

        let quad = batch.requests()[0].quad;
        // Origin snapped to (10, 21), size 32x16, anchor scaled to (16, 8)
        assert_eq!(
            positions(&quad),
            [[-6.0, 13.0], [-6.0, 29.0], [26.0, 13.0], [26.0, 29.0]]
        );
        assert_eq!(quad.top_left.uv, [0.25, 0.25]);
        assert_eq!(quad.bottom_right.uv, [0.5, 0.5]);
        assert_eq!(quad.top_right.color, [255, 0, 0, 255]);
    }

    #[test]
    fn test_vertex_mode_upload() {
        let mut textures = TextureRegistry::new();
        let a = textures.register(8, 8);
        let b = textures.register(8, 8);
        let mut batch = ready_batch();
        batch.program_mut().clear();

        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();
        for page in [a, a, b] {
            batch
                .draw_texture_full(page, Vec2::ZERO, DrawParams::default())
                .unwrap();
        }
        batch.end().unwrap();

        assert_eq!(batch.vertices().len(), 18);
        assert!(batch.indices().is_empty());
        assert_eq!(
            batch.batches(),
            &[
                RenderBatch {
                    offset: 0,
                    count: 12,
                    page: a
                },
                RenderBatch {
                    offset: 12,
                    count: 6,
                    page: b
                },
            ]
        );

        let program = batch.program();
        assert_eq!(
            program.calls()[0],
            ProgramCall::UploadVertices {
                bytes: 18 * 20,
                usage: BufferUsage::Dynamic
            }
        );
        assert_eq!(program.draws(), vec![(0, 12), (12, 6)]);
        assert_eq!(
            program.uniforms(TEXTURE_UNIFORM),
            vec![UniformValue::Texture(a), UniformValue::Texture(b)]
        );
    }

    #[test]
    fn test_empty_frame_issues_no_draws() {
        let mut batch = ready_batch();
        batch.program_mut().clear();
        batch.begin(Mat4::IDENTITY, SortOrder::BackToFront).unwrap();
        batch.end().unwrap();
        assert!(batch.batches().is_empty());
        assert!(batch.program().calls().is_empty());
    }

    #[test]
    fn test_begin_clears_previous_frame() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(8, 8);
        let mut batch = ready_batch();

        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();
        batch
            .draw_texture_full(page, Vec2::ZERO, DrawParams::default())
            .unwrap();
        batch.end().unwrap();
        assert_eq!(batch.batches().len(), 1);

        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();
        assert!(batch.requests().is_empty());
        assert!(batch.batches().is_empty());
    }

    #[test]
    fn test_draw_texture_to_derives_scale() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(16, 16);
        let mut batch = ready_batch();
        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();

        batch
            .draw_texture_to(
                page,
                IntRect::new(0, 0, 8, 8),
                Rect::new(5.0, 5.0, 32.0, 16.0),
                DrawParams::default(),
            )
            .unwrap();
        batch
            .draw_texture_to(
                page,
                IntRect::new(0, 0, 0, 8),
                Rect::new(5.0, 5.0, 32.0, 16.0),
                DrawParams::default(),
            )
            .unwrap();

        assert_eq!(batch.requests().len(), 1);
        assert_eq!(batch.requests()[0].quad.bottom_right.position, [37.0, 21.0]);
    }

    #[test]
    fn test_draw_rectangle() {
        let mut textures = TextureRegistry::new();
        let pixel = textures.register(1, 1);
        let mut batch = ready_batch();
        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();

        assert_eq!(
            batch.draw_rectangle(Rect::new(0.0, 0.0, 4.0, 4.0), DrawParams::default()),
            Err(BatchError::MissingPixelTexture)
        );

        batch.set_pixel_texture(pixel);
        batch
            .draw_rectangle(
                Rect::new(10.0, 10.0, 20.0, 10.0),
                DrawParams::default().with_anchor(Vec2::new(10.0, 5.0)),
            )
            .unwrap();

        let quad = batch.requests()[0].quad;
        assert_eq!(
            positions(&quad),
            [[0.0, 5.0], [0.0, 15.0], [20.0, 5.0], [20.0, 15.0]]
        );
        assert_eq!(quad.bottom_right.uv, [1.0, 1.0]);
    }

    fn depths(batch: &SpriteBatch<RecordingProgram>) -> Vec<f32> {
        batch.requests().iter().map(|r| r.depth).collect()
    }

    #[test]
    fn test_depth_sorts_with_nan_stay_ordered() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(8, 8);
        let mut batch = ready_batch();

        let submitted: Vec<f32> = (0..60)
            .map(|i| if i % 3 == 0 { f32::NAN } else { (i % 7) as f32 })
            .collect();

        for order in [SortOrder::BackToFront, SortOrder::FrontToBack] {
            batch.begin(Mat4::IDENTITY, order).unwrap();
            for depth in &submitted {
                batch
                    .draw_texture(
                        page,
                        IntRect::new(0, 0, 8, 8),
                        Vec2::ZERO,
                        DrawParams::default().with_depth(*depth),
                    )
                    .unwrap();
            }
            batch.end().unwrap();

            let sorted = depths(&batch);
            let valid: Vec<f32> = sorted.iter().copied().filter(|d| !d.is_nan()).collect();
            let nan_positions: Vec<usize> = (0..sorted.len()).filter(|&i| sorted[i].is_nan()).collect();
            assert_eq!(valid.len(), 40);
            assert_eq!(nan_positions.len(), 20);

            if order == SortOrder::BackToFront {
                assert!(valid.windows(2).all(|w| w[0] >= w[1]));
                // NaN sorts above every depth, so it is drawn first
                assert_eq!(nan_positions, (0..20).collect::<Vec<_>>());
            } else {
                assert!(valid.windows(2).all(|w| w[0] <= w[1]));
                assert_eq!(nan_positions, (40..60).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_draw_glyphs_is_all_or_nothing() {
        let mut textures = TextureRegistry::new();
        let page = textures.register(32, 32);
        let broken = textures.register(0, 0);
        let mut batch = ready_batch();
        batch.begin(Mat4::IDENTITY, SortOrder::None).unwrap();
        batch
            .draw_texture(page, IntRect::new(0, 0, 4, 4), Vec2::ZERO, DrawParams::default())
            .unwrap();

        let cell = |page, x| ProjectedGlyph {
            ch: 'a',
            frame: Frame {
                source: IntRect::new(0, 0, 4, 4),
                trim_offset: IVec2::ZERO,
                logical_size: IVec2::new(4, 4),
                rotated: false,
                page,
            },
            destination: IVec2::new(x, 0),
        };
        let glyphs = [cell(page, 0), cell(page, 5), cell(broken, 10)];

        assert_eq!(
            batch.draw_glyphs(&glyphs, Vec2::ZERO, DrawParams::default()),
            Err(BatchError::InvalidTexture)
        );
        assert_eq!(batch.requests().len(), 1);
        assert!(batch.is_drawing());
    }
}
