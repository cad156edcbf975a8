use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fb_ascii::render;
use fb_core::config::{CharsetMode, ColorMode, DisplayConfig};
use fb_source::memory::MemorySource;

fn gradient(width: u32, height: u32) -> MemorySource {
    MemorySource::from_fn(width, height, |x, y| {
        ((x * 255 / width) as u8, (y * 255 / height) as u8, ((x + y) % 256) as u8)
    })
}

fn bench_render(c: &mut Criterion) {
    let source = gradient(1920, 1080);
    let mut group = c.benchmark_group("render_1080p");

    for (name, mode) in [
        ("truecolor", ColorMode::TrueColor),
        ("cube256", ColorMode::Cube256),
        ("none", ColorMode::None),
    ] {
        let config = DisplayConfig {
            output_width: 160,
            output_height: 48,
            color_mode: mode,
            charset: CharsetMode::Simple,
            ..Default::default()
        };
        group.bench_function(name, |b| {
            b.iter(|| render(black_box(&source), black_box(&config)));
        });
    }
    group.finish();
}

fn bench_solid_runs(c: &mut Criterion) {
    let source = MemorySource::solid(1920, 1080, (40, 80, 160));
    let config = DisplayConfig {
        output_width: 240,
        output_height: 67,
        ..Default::default()
    };
    c.bench_function("render_solid_runlength", |b| {
        b.iter(|| render(black_box(&source), black_box(&config)));
    });
}

criterion_group!(benches, bench_render, bench_solid_runs);
criterion_main!(benches);
