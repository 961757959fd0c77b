use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use multimap_store::SharedMultiMap;
use rand_core::{RngCore, SeedableRng};
use rand_pcg::Lcg128Xsl64 as Pcg;

const THREADS: usize = 4;
const OPS: usize = 10_000;

fn bench_parallel_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared::contains");
    group.throughput(Throughput::Elements((THREADS * OPS) as u64));
    let m = SharedMultiMap::new();
    let mut rng = Pcg::seed_from_u64(11);
    let keys: Vec<u64> = (0..OPS).map(|_| rng.next_u64() % 4096).collect();
    for (i, k) in keys.iter().enumerate() {
        m.insert(*k, i as u64);
    }
    group.bench_function("4_readers_10k_each", |b| {
        b.iter(|| {
            std::thread::scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        for k in &keys {
                            black_box(m.contains(k));
                        }
                    });
                }
            })
        })
    });
    group.finish();
}

fn bench_parallel_insert_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared::insert_extract");
    group.throughput(Throughput::Elements((THREADS * OPS * 2) as u64));
    group.bench_function("4_writers_10k_pairs", |b| {
        b.iter_batched(
            SharedMultiMap::<u64, u64>::new,
            |m| {
                std::thread::scope(|s| {
                    for t in 0..THREADS as u64 {
                        let m = &m;
                        s.spawn(move || {
                            let mut rng = Pcg::seed_from_u64(t);
                            for i in 0..OPS as u64 {
                                let k = rng.next_u64() % 256;
                                m.insert(k, i);
                                black_box(m.extract(&k).ok());
                            }
                        });
                    }
                });
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_parallel_contains, bench_parallel_insert_extract);
criterion_main!(benches);
