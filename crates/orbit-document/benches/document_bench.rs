// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the two per-page hot loops: the line diff and the
// colour transform applied to every rasterized page.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use orbit_core::ColorMode;
use orbit_document::RasterFrame;
use orbit_document::diff::diff_lines;
use orbit_document::text::{TextRun, group_lines};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A page of `count` lines, every `every`th one reworded.
fn page_lines(count: usize, every: usize) -> Vec<orbit_document::text::Line> {
    let runs = (0..count)
        .map(|i| {
            let text = if every > 0 && i % every == 0 {
                format!("line {} revised wording", i)
            } else {
                format!("line {} of the agreement", i)
            };
            TextRun::upright(text, 72.0, 760.0 - i as f32 * 14.0, 12.0, 200.0)
        })
        .collect();
    group_lines(runs)
}

/// A letter page at scale 1.0 with dark "text" bars on white.
fn synthetic_page() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(612, 792, Rgba([255, 255, 255, 255]));
    for row in 0..40 {
        draw_filled_rect_mut(
            &mut image,
            Rect::at(72, 60 + row * 17).of_size(420, 9),
            Rgba([25, 25, 25, 255]),
        );
    }
    image
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_diff_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_lines");
    for count in [50usize, 200] {
        let before = page_lines(count, 0);
        let after = page_lines(count, 7);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(diff_lines(black_box(&before), black_box(&after))));
        });
    }
    group.finish();
}

fn bench_color_mode(c: &mut Criterion) {
    let page = synthetic_page();
    let mut group = c.benchmark_group("apply_color_mode (612x792)");
    for (name, mode) in [("grayscale", ColorMode::Grayscale), ("both", ColorMode::Both)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut frame = RasterFrame::from_image(page.clone());
                frame.apply_color_mode(black_box(mode));
                black_box(frame);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_diff_lines, bench_color_mode);
criterion_main!(benches);
