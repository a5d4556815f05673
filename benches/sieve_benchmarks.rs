use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use primesieve::{sieve, sieve_parallel, CountFlags};

/// A handful of round, representative intervals: small (fits in L1), medium
/// (exercises EratMedium), and large (exercises EratBig).
fn bench_sieve_serial(c: &mut Criterion) {
    let mut group = c.benchmark_group("sieve_serial");

    for &stop in &[10_000u64, 1_000_000, 100_000_000] {
        group.bench_with_input(BenchmarkId::new("count_primes", stop), &stop, |b, &stop| {
            b.iter(|| sieve(0, black_box(stop), CountFlags::primes_only()).unwrap());
        });
    }

    group.finish();
}

fn bench_sieve_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("sieve_parallel");

    for &stop in &[10_000_000u64, 1_000_000_000] {
        group.bench_with_input(BenchmarkId::new("count_primes", stop), &stop, |b, &stop| {
            b.iter(|| sieve_parallel(0, black_box(stop), CountFlags::primes_only()).unwrap());
        });
    }

    group.finish();
}

fn bench_ktuplet_counting(c: &mut Criterion) {
    let mut group = c.benchmark_group("ktuplets");
    let flags = CountFlags {
        twins: true,
        triplets: true,
        ..Default::default()
    };

    group.bench_function("twins_and_triplets_below_10m", |b| {
        b.iter(|| sieve(0, black_box(10_000_000), flags).unwrap());
    });

    group.finish();
}

fn bench_fill_primes(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_primes");

    group.bench_function("collect_primes_below_1m", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            primesieve::fill_primes(0, black_box(1_000_000), &mut out).unwrap();
            out
        });
    });

    group.finish();
}

fn bench_iterator(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterator");

    group.bench_function("advance_10k_primes_from_zero", |b| {
        b.iter(|| {
            let mut it = primesieve::iterator(0, u64::MAX);
            for _ in 0..10_000 {
                black_box(it.next());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sieve_serial,
    bench_sieve_parallel,
    bench_ktuplet_counting,
    bench_fill_primes,
    bench_iterator
);
criterion_main!(benches);
