use criterion::{criterion_group, criterion_main, Criterion};
use dyaa_core::RngHandle;
use dyaa_mc::{build_grid, run_partitioned, GridFiller, GridLayout};

fn bench_fill(c: &mut Criterion) {
    let filler = GridFiller::drell_yan_aa(10.0, 7000.0).unwrap();
    let layout = GridLayout::default();

    c.bench_function("fill_10k_sequential", |b| {
        b.iter(|| {
            let mut grid = build_grid(&layout).unwrap();
            let mut rng = RngHandle::from_seed(42);
            filler.run(&mut rng, &mut grid, 10_000).unwrap()
        })
    });

    c.bench_function("fill_10k_four_workers", |b| {
        b.iter(|| {
            let mut grid = build_grid(&layout).unwrap();
            run_partitioned(&filler, &mut grid, 10_000, 4, 42, None).unwrap()
        })
    });
}

criterion_group!(benches, bench_fill);
criterion_main!(benches);
