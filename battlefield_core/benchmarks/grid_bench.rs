use battlefield_core::{
    distance, shortest_path, tiles_in_radius, BattlefieldPresets, BattlefieldSize, TilePosition,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_geometry(c: &mut Criterion) {
    let presets = BattlefieldPresets::builtin();
    let mut group = c.benchmark_group("grid");

    for size in BattlefieldSize::ALL {
        let Some(dims) = presets.dimensions(size) else {
            continue;
        };
        let corner = TilePosition::new(0, 0);
        let last_row = dims.rows as i32 - 1;
        let far = TilePosition::new(last_row, dims.cols_in_row(last_row) as i32 - 1);
        let centre = TilePosition::new(dims.rows as i32 / 2, dims.cols as i32 / 2);

        group.bench_with_input(BenchmarkId::new("distance", size), &dims, |b, &dims| {
            b.iter(|| distance(dims, black_box(corner), black_box(far)))
        });
        group.bench_with_input(BenchmarkId::new("radius_3", size), &dims, |b, &dims| {
            b.iter(|| tiles_in_radius(dims, black_box(centre), 3, false))
        });
        group.bench_with_input(BenchmarkId::new("path", size), &dims, |b, &dims| {
            b.iter(|| shortest_path(dims, black_box(corner), black_box(far)))
        });
    }

    group.finish();
}

criterion_group!(grid_benches, bench_geometry);
criterion_main!(grid_benches);
