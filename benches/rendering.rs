/// Benchmark suite for the splat rendering pipeline
/// Measures buffer clearing, projection and full-frame rasterization.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use splat_engine::rendering::FrameView;
use splat_engine::{generate_cloud, Camera, Framebuffer, RenderConfig, SceneConfig, SplatRenderer};

fn bench_camera() -> Camera {
    let mut camera = Camera::default();
    camera.position = Vec3::new(0.0, 0.0, 3.0);
    camera
}

fn bench_framebuffer_clear(c: &mut Criterion) {
    c.bench_function("framebuffer_clear", |b| {
        let mut framebuffer = Framebuffer::new(1280, 720).unwrap();

        b.iter(|| {
            framebuffer.clear();
            black_box(framebuffer.depth_buffer());
        });
    });
}

fn bench_project_splats(c: &mut Criterion) {
    let splats = generate_cloud(&SceneConfig {
        splat_count: 100_000,
        ..Default::default()
    });
    let camera = bench_camera();
    let view = FrameView::new(&camera, 1280, 720, 90.0);

    c.bench_function("project_100k_splats", |b| {
        b.iter(|| {
            let visible = splats
                .iter()
                .enumerate()
                .filter(|(i, s)| matches!(view.project(*i, s), splat_engine::rendering::Projection::Visible(_)))
                .count();
            black_box(visible)
        });
    });
}

fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group.sample_size(20);

    let camera = bench_camera();
    for splat_count in [10_000usize, 100_000, 400_000] {
        let splats = generate_cloud(&SceneConfig {
            splat_count,
            ..Default::default()
        });

        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            let mut renderer = SplatRenderer::new(
                800,
                600,
                RenderConfig {
                    parallel,
                    ..Default::default()
                },
            )
            .unwrap();

            group.bench_with_input(BenchmarkId::new(label, splat_count), &splats, |b, splats| {
                b.iter(|| black_box(renderer.render(black_box(splats), &camera)));
            });
        }
    }

    group.finish();

    #[cfg(feature = "profiling")]
    {
        let splats = generate_cloud(&SceneConfig::default());
        let mut renderer = SplatRenderer::new(800, 600, RenderConfig::default()).unwrap();
        let mut counters = splat_engine::perf::profiling::hardware::PerfCounters::new();
        let (_, snapshot) = counters.measure(|| renderer.render(&splats, &camera));
        println!("Hardware counters for one parallel frame ({} splats):", splats.len());
        snapshot.print_report();
    }
}

criterion_group!(
    benches,
    bench_framebuffer_clear,
    bench_project_splats,
    bench_render_frame
);
criterion_main!(benches);
