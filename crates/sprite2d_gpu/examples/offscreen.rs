//! Offscreen Sprite Demo
//!
//! Renders a few sprites and rectangles into an offscreen texture with the
//! wgpu backend and logs how they were batched.
//!
//! Run with: RUST_LOG=debug cargo run -p sprite2d_gpu --example offscreen

use std::sync::Arc;

use anyhow::{anyhow, Result};
use sprite2d_core::{Color, IntRect, Mat4, Rect, Vec2};
use sprite2d_gpu::{DrawParams, SortOrder, SpriteBatch, WgpuProgram};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let (device, queue) = pollster::block_on(request_device())?;
    let format = wgpu::TextureFormat::Rgba8UnormSrgb;

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Target"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut program = WgpuProgram::new(device, queue, format);
    let pixel = program.create_pixel_texture()?;
    let checker = program.create_texture_rgba8(8, 8, &checkerboard(8))?;

    let mut batch = SpriteBatch::new(program);
    batch.init()?;
    batch.set_pixel_texture(pixel);

    batch.begin(Mat4::screen(WIDTH as f32, HEIGHT as f32), SortOrder::Texture)?;
    batch.draw_rectangle(
        Rect::new(16.0, 16.0, 288.0, 208.0),
        DrawParams::default().with_tint(Color::from_hex(0x1e1e2e)),
    )?;
    for i in 0..4 {
        batch.draw_texture(
            checker,
            IntRect::new(0, 0, 8, 8),
            Vec2::new(60.0 + 60.0 * i as f32, 120.0),
            DrawParams::default()
                .with_scale(Vec2::new(4.0, 4.0))
                .with_anchor(Vec2::new(4.0, 4.0))
                .with_rotation(0.3 * i as f32),
        )?;
    }
    batch.draw_rectangle(
        Rect::new(40.0, 200.0, 240.0, 4.0),
        DrawParams::default().with_tint(Color::ORANGE),
    )?;
    batch.end()?;

    tracing::info!(
        requests = batch.requests().len(),
        batches = batch.batches().len(),
        vertices = batch.vertices().len(),
        "frame batched"
    );

    batch.program_mut().flush(&view, Some(Color::BLACK))?;

    tracing::info!("frame submitted");
    Ok(())
}

async fn request_device() -> Result<(Arc<wgpu::Device>, Arc<wgpu::Queue>)> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sprite2d Offscreen Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
            },
            None,
        )
        .await?;

    Ok((Arc::new(device), Arc::new(queue)))
}

fn checkerboard(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x + y) % 2 == 0 {
                [255, 255, 255, 255]
            } else {
                [90, 90, 110, 255]
            }
        })
        .collect()
}
