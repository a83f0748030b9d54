use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tessel_core::math::{Mat4, Vec3};
use tessel_core::renderer::api::{UniformArena, STD140_STRUCT_ALIGNMENT};
use tessel_core::renderer::testing::RecordingDevice;
use tessel_core::renderer::DeviceLimits;

fn bench_frame_packing(c: &mut Criterion) {
    let mut device = RecordingDevice::with_limits(DeviceLimits {
        uniform_buffer_offset_alignment: 256,
        max_uniform_block_size: 1 << 20,
    });
    let mut arena = UniformArena::from_device_limits(&mut device).unwrap();
    let view_projection = Mat4::perspective_rh_gl(1.0, 16.0 / 9.0, 0.1, 100.0);

    let mut group = c.benchmark_group("Uniform Arena");

    group.bench_function("16 lights + 1000 entity blocks", |b| {
        b.iter(|| {
            arena.begin_write(&mut device).unwrap();
            let globals = arena.begin_block().unwrap();
            arena.push_vec3(Vec3::new(0.0, 0.0, 5.0)).unwrap();
            arena.push_u32(16).unwrap();
            for i in 0..16 {
                arena.align_head(STD140_STRUCT_ALIGNMENT).unwrap();
                arena.push_u32(i % 2).unwrap();
                arena.push_vec3(Vec3::ONE).unwrap();
                arena.push_vec3(Vec3::NEG_Y).unwrap();
                arena.push_vec3(Vec3::splat(i as f32)).unwrap();
                arena.push_f32(0.5).unwrap();
            }
            black_box(arena.end_block(globals));
            for i in 0..1000 {
                let start = arena.begin_block().unwrap();
                arena
                    .push_mat4(Mat4::from_translation(Vec3::splat(i as f32)))
                    .unwrap();
                arena.push_mat4(view_projection).unwrap();
                black_box(arena.end_block(start));
            }
            arena.end_write(&mut device).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_frame_packing);
criterion_main!(benches);
