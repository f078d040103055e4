use chained_hashmap::{ChainedHashMap, GrowthPolicy};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// Bulk insertion of 100k string keys against reference maps.
fn bench_insert_100k(c: &mut Criterion) {
    let keys: Vec<String> = (0..100_000u64).map(|i| i.to_string()).collect();
    let mut g = c.benchmark_group("insert_100k");
    g.bench_function("chained", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| {
                let m = ChainedHashMap::new();
                for (i, k) in keys.into_iter().enumerate() {
                    m.add(k, i);
                }
                black_box(m)
            },
            BatchSize::LargeInput,
        )
    });
    g.bench_function("chained_truncated_growth", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| {
                let m: ChainedHashMap<String, usize> = ChainedHashMap::builder()
                    .growth(GrowthPolicy::Truncated(0.82))
                    .build()
                    .unwrap();
                for (i, k) in keys.into_iter().enumerate() {
                    m.add(k, i);
                }
                black_box(m)
            },
            BatchSize::LargeInput,
        )
    });
    g.bench_function("std", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| {
                let mut m = std::collections::HashMap::new();
                for (i, k) in keys.into_iter().enumerate() {
                    m.insert(k, i);
                }
                black_box(m)
            },
            BatchSize::LargeInput,
        )
    });
    g.bench_function("hashbrown", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| {
                let mut m = hashbrown::HashMap::new();
                for (i, k) in keys.into_iter().enumerate() {
                    m.insert(k, i);
                }
                black_box(m)
            },
            BatchSize::LargeInput,
        )
    });
    g.finish();
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("chained_get_hit", |b| {
        let m = ChainedHashMap::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.add(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("chained_get_miss", |b| {
        let m = ChainedHashMap::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.add(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_key_by_value(c: &mut Criterion) {
    c.bench_function("chained_get_key_by_value_10k", |b| {
        let m = ChainedHashMap::new();
        for (i, x) in lcg(5).take(10_000).enumerate() {
            m.add(key(x), i as u64);
        }
        let mut v = 0u64;
        b.iter(|| {
            v = (v + 7919) % 10_000;
            black_box(m.get_key_by_value(&v));
        })
    });
}

// Contended adds from 4 threads; measures lock serialization.
fn bench_concurrent_add(c: &mut Criterion) {
    c.bench_function("chained_concurrent_add_4x10k", |b| {
        b.iter(|| {
            let m = Arc::new(ChainedHashMap::new());
            let handles: Vec<_> = (0..4u64)
                .map(|t| {
                    let m = Arc::clone(&m);
                    std::thread::spawn(move || {
                        for x in lcg(t + 1).take(10_000) {
                            m.add(x, t);
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
            black_box(m.len())
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_100k, bench_get_hit, bench_get_miss, bench_get_key_by_value, bench_concurrent_add
}
criterion_main!(benches);
