//! Benchmark: full-grid instance fill at typical overlay grid sizes.
//!
//! The fill runs every frame, so it has to stay comfortably inside a 60 Hz
//! budget even for a full-screen grid (tens of thousands of cells).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glyphfall_sim::{fill_instances, CellInstance, DropTuning, RainGrid};

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_instances");

    // Narrow strip, half screen, full 4K-ish screen.
    for (cols, rows) in [(30usize, 68usize), (80, 68), (240, 135)] {
        let mut grid = RainGrid::with_seed(DropTuning::default(), 7);
        grid.resize(cols, rows);
        grid.advance(0.016);

        let mut out: Vec<CellInstance> = Vec::new();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", cols, rows)),
            &(cols, rows),
            |b, _| {
                b.iter(|| {
                    fill_instances(black_box(&grid), 16.0, &mut out);
                    black_box(out.len())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_fill);
criterion_main!(benches);
