// Unsynchronized core, for comparison with the locked map.
use chained_hashmap::table::Table;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
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

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("table::insert_fresh_100k", |b| {
        b.iter_batched(
            Table::<String, u64>::new,
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    let _ = t.add(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_set_overwrite(c: &mut Criterion) {
    c.bench_function("table::set_overwrite_10k", |b| {
        let mut t = Table::new();
        let keys: Vec<_> = lcg(3).take(10_000).map(key).collect();
        for k in &keys {
            t.set(k.clone(), 0u64);
        }
        let mut n = 0u64;
        b.iter(|| {
            for k in &keys {
                n = n.wrapping_add(1);
                black_box(t.set(k.clone(), n));
            }
        })
    });
}

fn bench_remove_all_value(c: &mut Criterion) {
    c.bench_function("table::remove_all_value_10k", |b| {
        b.iter_batched(
            || {
                let mut t = Table::new();
                for (i, x) in lcg(9).take(10_000).enumerate() {
                    let _ = t.add(x, (i % 4) as u8);
                }
                t
            },
            |mut t| {
                let mut removed = Vec::new();
                black_box(t.remove_all_value(&0, &mut removed))
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter(c: &mut Criterion) {
    c.bench_function("table::iter_10k", |b| {
        let mut t = Table::new();
        for (i, x) in lcg(13).take(10_000).enumerate() {
            let _ = t.add(x, i as u64);
        }
        b.iter(|| black_box(t.iter().map(|(_, v)| *v).sum::<u64>()))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_set_overwrite, bench_remove_all_value, bench_iter
}
criterion_main!(benches);
