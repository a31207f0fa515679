// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the synchronous pipeline stages on a synthetic
// three-engine frame.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use lingolens_core::config::{DedupConfig, OrderingConfig};
use lingolens_core::{BoundingBox, Detection};
use lingolens_pipeline::{ReadingOrderSorter, SpatialDeduplicator};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 20x10 grid of words read by three engines, each engine slightly offset
/// so every grid cell produces three heavily overlapping detections.
fn synthetic_frame() -> Vec<Detection> {
    let mut detections = Vec::with_capacity(600);
    for engine in 0..3u8 {
        let jitter = f32::from(engine);
        for row in 0..10u8 {
            for col in 0..20u8 {
                let x = f32::from(col) * 60.0 + jitter;
                let y = f32::from(row) * 30.0 + jitter;
                detections.push(Detection::new(
                    BoundingBox::new(x, y, x + 50.0, y + 20.0),
                    format!("W{row}-{col}"),
                    0.5 + f32::from(engine) * 0.15,
                ));
            }
        }
    }
    detections
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_deduplicate(c: &mut Criterion) {
    let frame = synthetic_frame();
    let dedup = SpatialDeduplicator::new(&DedupConfig::default());

    c.bench_function("deduplicate (600 detections)", |b| {
        b.iter(|| black_box(dedup.deduplicate(black_box(frame.clone()))));
    });
}

fn bench_reading_order(c: &mut Criterion) {
    let mut frame = synthetic_frame();
    frame.truncate(200);
    frame.reverse();
    let sorter = ReadingOrderSorter::new(&OrderingConfig::default());

    c.bench_function("reading_order (200 boxes)", |b| {
        b.iter(|| {
            let mut items = black_box(frame.clone());
            sorter.sort_by_box(&mut items, |d| &d.bbox);
            black_box(items);
        });
    });
}

criterion_group!(benches, bench_deduplicate, bench_reading_order);
criterion_main!(benches);
