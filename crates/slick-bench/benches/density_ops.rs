//! Criterion micro-benchmarks for the filter → bin → estimate pipeline.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use slick_bench::{coastal_profile, spill_particles};
use slick_fields::{DensityEstimator, DensityPipeline};
use slick_space::{ParticleIndex, RegionGrid};

fn coastal_grid() -> RegionGrid {
    let config = coastal_profile();
    RegionGrid::build(&config.region().unwrap(), config.grid().unwrap())
}

/// Benchmark: filter and bin a spill into the coastal grid.
fn bench_particle_index(c: &mut Criterion) {
    let grid = coastal_grid();
    let particles = spill_particles(10_000, 0.3, 7);

    c.bench_function("particle_index_10k", |b| {
        b.iter(|| black_box(ParticleIndex::build(&particles, grid.grid())));
    });
}

/// Benchmark: full density pipeline at increasing particle counts.
fn bench_density_pipeline(c: &mut Criterion) {
    let grid = coastal_grid();
    let pipeline = DensityPipeline::new(&grid, DensityEstimator::default());

    let mut group = c.benchmark_group("density_pipeline");
    group.sample_size(10);
    for n in [100, 1_000, 5_000] {
        let particles = spill_particles(n, 0.3, 11);
        group.bench_with_input(BenchmarkId::from_parameter(n), &particles, |b, p| {
            b.iter(|| black_box(pipeline.run(p)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_particle_index, bench_density_pipeline);
criterion_main!(benches);
