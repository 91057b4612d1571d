//! Criterion benchmarks for the Boolean core.
//! Focus sizes: n random rectangles per side, n in {10, 50, 200}.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use polybool::{union, FillRule, Path64, Paths64, Point64};

fn random_rects(n: usize, seed: u64) -> Paths64 {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen_range(0..10_000);
            let y = rng.gen_range(0..10_000);
            let w = rng.gen_range(1..2_000);
            let h = rng.gen_range(1..2_000);
            vec![
                Point64::new(x, y),
                Point64::new(x + w, y),
                Point64::new(x + w, y + h),
                Point64::new(x, y + h),
            ]
        })
        .collect()
}

/// A many-toothed comb, which keeps a wide active-edge list alive across
/// the whole sweep.
fn comb(teeth: i64, origin_x: i64) -> Path64 {
    let mut path = vec![Point64::new(origin_x, 0)];
    for t in 0..teeth {
        let x = origin_x + t * 20;
        path.push(Point64::new(x + 10, 1_000));
        path.push(Point64::new(x + 20, 0));
    }
    path.push(Point64::new(origin_x + teeth * 20, 2_000));
    path.push(Point64::new(origin_x, 2_000));
    path
}

fn bench_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("union");
    for &n in &[10usize, 50, 200] {
        let subjects = random_rects(n, 7);
        let clips = random_rects(n, 43);
        group.bench_with_input(BenchmarkId::new("random_rects", n), &n, |b, _| {
            b.iter(|| union(&subjects, &clips, FillRule::NonZero).unwrap())
        });
    }
    group.finish();
}

fn bench_combs(c: &mut Criterion) {
    let mut group = c.benchmark_group("combs");
    for &teeth in &[16i64, 64, 256] {
        let subjects = vec![comb(teeth, 0)];
        let clips = vec![comb(teeth, 7)];
        group.bench_with_input(BenchmarkId::new("interleaved", teeth), &teeth, |b, _| {
            b.iter(|| union(&subjects, &clips, FillRule::NonZero).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_union, bench_combs);
criterion_main!(benches);
