use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sprite2d_core::{IntRect, Mat4, TextureHandle, TextureRegistry, Vec2};
use sprite2d_gpu::{DrawParams, RecordingProgram, SortOrder, SpriteBatch};

fn frame(batch: &mut SpriteBatch<RecordingProgram>, pages: &[TextureHandle], count: usize, order: SortOrder) {
    batch.begin(Mat4::IDENTITY, order).unwrap();
    for i in 0..count {
        let page = pages[i % pages.len()];
        batch
            .draw_texture(
                page,
                IntRect::new(0, 0, 16, 16),
                Vec2::new((i % 64) as f32 * 16.0, (i / 64) as f32 * 16.0),
                DrawParams::default()
                    .with_rotation(i as f32 * 0.01)
                    .with_depth((i % 17) as f32),
            )
            .unwrap();
    }
    batch.end().unwrap();
    batch.program_mut().clear();
}

fn bench_sort_orders(c: &mut Criterion) {
    let mut textures = TextureRegistry::new();
    let pages: Vec<_> = (0..4).map(|_| textures.register(256, 256)).collect();

    let mut group = c.benchmark_group("sprite_batch");
    for order in [
        SortOrder::None,
        SortOrder::BackToFront,
        SortOrder::Texture,
    ] {
        for count in [1_000usize, 20_000] {
            let mut batch = SpriteBatch::new(RecordingProgram::new());
            batch.init().unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{order:?}"), count),
                &count,
                |b, &count| b.iter(|| frame(&mut batch, black_box(&pages), count, order)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_sort_orders);
criterion_main!(benches);
