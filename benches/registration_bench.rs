//! Benchmarks for the per-evaluation hot path of the aligner.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mi_align::*;

fn scene(size: usize) -> Image {
    SyntheticScene::square(size)
        .with_seed(3)
        .render()
        .expect("synthetic scene")
}

fn bench_nmi(c: &mut Criterion) {
    let mut group = c.benchmark_group("nmi");
    for size in [64, 256, 512] {
        let a = scene(size);
        let b = GroundTruth::shift(2.0, 3.0).inverted().apply(&a.view());
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, _| {
            bencher.iter(|| nmi(black_box(&a.view()), black_box(&b.view())))
        });
    }
    group.finish();
}

fn bench_warp(c: &mut Criterion) {
    let image = scene(512);
    let transform = RigidTransform::rotation_about(0.2, (255.5, 255.5));
    let mut group = c.benchmark_group("warp_512");
    for order in [InterpolationOrder::Linear, InterpolationOrder::Cubic] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", order)), &order, |bencher, &order| {
            bencher.iter(|| warp(black_box(&image.view()), &transform, order))
        });
    }
    group.finish();
}

fn bench_cost(c: &mut Criterion) {
    let a = scene(256);
    let b = GroundTruth::rotation(5.0).apply(&a.view());
    let cost = NmiCost::new(a.view(), b.view()).expect("same shape");
    c.bench_function("cost_nmi_256", |bencher| {
        bencher.iter(|| cost.evaluate(black_box(&[0.05, 1.0, -2.0])))
    });
}

fn bench_pyramid(c: &mut Criterion) {
    let image = scene(512);
    c.bench_function("build_pyramid_512", |bencher| {
        bencher.iter(|| build_pyramid(black_box(&image.view()), 4, 2.0))
    });
}

criterion_group!(benches, bench_nmi, bench_warp, bench_cost, bench_pyramid);
criterion_main!(benches);
