//! Performance benchmarks for the pixel-level renderers
//!
//! Run with: cargo bench --bench aura_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgba, RgbaImage};
use kirlian_core::grv::analyze;
use kirlian_core::{overlay_aura, render_aura, ChakraEnergyProfile, Finger, GrvSimulator, Hand};

fn sample_profile() -> ChakraEnergyProfile {
    ChakraEnergyProfile::from_values([85.0, 60.0, 45.0, 90.0, 70.0, 30.0, 55.0])
}

/// Benchmark aura compositing at the canvas sizes the UI uses
fn bench_render_aura(c: &mut Criterion) {
    let profile = sample_profile();
    let mut group = c.benchmark_group("render_aura");

    for (width, height) in [(250, 300), (500, 600), (1000, 1200)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &(width, height),
            |b, &(w, h)| b.iter(|| black_box(render_aura(&profile, w, h))),
        );
    }
    group.finish();
}

/// Benchmark overlay including the resize to photo size
fn bench_overlay(c: &mut Criterion) {
    let aura = render_aura(&sample_profile(), 500, 600);
    let photo = RgbaImage::from_pixel(1000, 1200, Rgba([40, 40, 40, 255]));

    c.bench_function("overlay_resized_1000x1200", |b| {
        b.iter(|| black_box(overlay_aura(&photo, &aura)));
    });
}

/// Benchmark a single simulated capture followed by analysis
fn bench_grv(c: &mut Criterion) {
    let simulator = GrvSimulator::new(256, 42);
    let frame = simulator.capture(Hand::Left, Finger::Index);

    c.bench_function("grv_capture_256", |b| {
        b.iter(|| black_box(simulator.capture(Hand::Left, Finger::Index)));
    });
    c.bench_function("grv_analyze_256", |b| {
        b.iter(|| black_box(analyze(&frame, 50)));
    });
}

criterion_group!(benches, bench_render_aura, bench_overlay, bench_grv);
criterion_main!(benches);
