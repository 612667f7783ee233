use std::hint::black_box;
use std::time::Instant;

use driftgrid_common::Viewport;
use driftgrid_kernel::{Scene, wrap};
use driftgrid_layout::{GridSpec, LayoutManifest};
use glam::DVec2;

fn make_scene(plane_count: usize) -> Scene {
    let sources = (0..plane_count).map(|i| format!("{i}.png")).collect();
    let layout = LayoutManifest::from_grid(&GridSpec::default(), sources);
    Scene::new(&layout, Viewport::new(1920.0, 1080.0))
}

fn bench_tick(plane_count: usize, iterations: usize) {
    let mut scene = make_scene(plane_count);

    let start = Instant::now();
    for i in 0..iterations {
        let target = DVec2::new(i as f64 * 13.0, i as f64 * -7.0);
        black_box(scene.tick(black_box(target)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  tick ({plane_count} planes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_wrap(iterations: usize) {
    let start = Instant::now();
    let mut acc = 0.0;
    for i in 0..iterations {
        acc += wrap(black_box(-1500.0), black_box(420.0), i as f64 * 3.7);
    }
    black_box(acc);
    let elapsed = start.elapsed();
    println!("  wrap ({iterations} iters): total {elapsed:?}");
}

fn main() {
    println!("=== driftgrid-kernel benchmarks ===");

    println!("\n--- Scene::tick ---");
    bench_tick(25, 10_000);
    bench_tick(500, 1_000);
    bench_tick(10_000, 100);

    println!("\n--- wrap ---");
    bench_wrap(1_000_000);

    println!("\nDone.");
}
