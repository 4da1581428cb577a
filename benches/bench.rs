use criterion::{black_box, criterion_group, criterion_main, Criterion};
use load_indicator::palettes::classify;
use load_indicator::{draw_strip, Indicator};

fn classify_sweep(c: &mut Criterion) {
    let values: Vec<f64> = (0..1000).map(|i| f64::from(i) / 500.0).collect();
    c.bench_function("classify 1000 ratios", |b| {
        b.iter(|| {
            for v in &values {
                black_box(classify(black_box(*v)));
            }
        })
    });
}

fn draw(c: &mut Criterion) {
    c.bench_function("draw 256px indicator", |b| {
        b.iter(|| Indicator::new(black_box(1.2)).draw(256, 256))
    });
    let values: Vec<f64> = (0..100).map(|i| f64::from(i) / 50.0).collect();
    c.bench_function("draw 100 cell strip", |b| {
        b.iter(|| draw_strip(black_box(&values), 32))
    });
}

criterion_group!(benches, classify_sweep, draw);
criterion_main!(benches);
