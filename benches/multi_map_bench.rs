use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use multimap_store::MultiMap;
use rand_core::{RngCore, SeedableRng};
use rand_pcg::Lcg128Xsl64 as Pcg;

const N: usize = 100_000;

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_map::insert");
    group.throughput(Throughput::Elements(N as u64));
    // Mostly distinct keys: one bucket per insert.
    group.bench_function("distinct_100k", |b| {
        b.iter_batched(
            MultiMap::<u64, u64>::new,
            |mut m| {
                let mut rng = Pcg::seed_from_u64(1);
                for i in 0..N {
                    m.insert(rng.next_u64(), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    // Heavy duplication: 64 keys, long chains.
    group.bench_function("dup64_100k", |b| {
        b.iter_batched(
            MultiMap::<u64, u64>::new,
            |mut m| {
                let mut rng = Pcg::seed_from_u64(2);
                for i in 0..N {
                    m.insert(rng.next_u64() % 64, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_map::extract");
    group.throughput(Throughput::Elements(10_000));
    // LIFO extraction never walks past the first node.
    group.bench_function("lifo_10k_of_100k", |b| {
        b.iter_batched(
            || {
                let mut m = MultiMap::new();
                let mut rng = Pcg::seed_from_u64(3);
                let keys: Vec<u64> = (0..N).map(|_| rng.next_u64() % 1024).collect();
                for (i, k) in keys.iter().enumerate() {
                    m.insert(*k, i as u64);
                }
                (m, keys)
            },
            |(mut m, keys)| {
                for k in keys.iter().take(10_000) {
                    black_box(m.extract(k).ok());
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    // Predicate extraction of the oldest value: full chain walk.
    group.throughput(Throughput::Elements(100));
    group.bench_function("oldest_by_predicate_1k_chain", |b| {
        b.iter_batched(
            || {
                let mut m = MultiMap::new();
                for i in 0..1_000u64 {
                    m.insert(0u64, i);
                }
                m
            },
            |mut m| {
                for i in 0..100u64 {
                    black_box(m.extract_where(&0, |v| *v == i).ok());
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_map::contains");
    group.throughput(Throughput::Elements(10_000));
    let mut m = MultiMap::new();
    let mut rng = Pcg::seed_from_u64(7);
    let keys: Vec<u64> = (0..N).map(|_| rng.next_u64()).collect();
    for (i, k) in keys.iter().enumerate() {
        m.insert(*k, i as u64);
    }
    let mut rng_q = Pcg::seed_from_u64(0x9e3779b97f4a7c15);
    let hits: Vec<u64> = (0..10_000)
        .map(|_| keys[(rng_q.next_u64() as usize) % keys.len()])
        .collect();
    let misses: Vec<u64> = (0..10_000).map(|_| rng_q.next_u64()).collect();
    group.bench_function("hit_10k_on_100k", |b| {
        b.iter(|| {
            for k in &hits {
                black_box(m.contains(k));
            }
        })
    });
    group.bench_function("miss_10k_on_100k", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(m.contains(k));
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_extract, bench_contains);
criterion_main!(benches);
