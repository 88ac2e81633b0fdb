use chained_hashtable::{HashTable, StrKeys};
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

fn filled(seed: u64, n: usize) -> (HashTable<String, u64, StrKeys>, Vec<String>) {
    let mut t = HashTable::new(16, StrKeys).unwrap();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        let _ = t.put(k.clone(), i as u64).unwrap();
    }
    (t, keys)
}

// Pick `count` pseudo-random entries of `keys`.
fn sample(keys: &[String], count: usize) -> Vec<String> {
    let n = keys.len();
    let mut s = 0x9e3779b97f4a7c15u64;
    (0..count)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            keys[(s as usize) % n].clone()
        })
        .collect()
}

fn bench_put_fresh_100k(c: &mut Criterion) {
    c.bench_function("table::put_fresh_100k", |b| {
        b.iter_batched(
            || HashTable::<String, u64, _>::new(16, StrKeys).unwrap(),
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    let _ = t.put(key(x), i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_put_presized_100k(c: &mut Criterion) {
    c.bench_function("table::put_presized_100k", |b| {
        b.iter_batched(
            || HashTable::<String, u64, _>::new(131_072, StrKeys).unwrap(),
            |mut t| {
                for (i, x) in lcg(2).take(100_000).enumerate() {
                    let _ = t.put(key(x), i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_put_update_10k(c: &mut Criterion) {
    c.bench_function("table::put_update_10k_on_100k", |b| {
        b.iter_batched(
            || {
                let (t, keys) = filled(3, 100_000);
                let targets = sample(&keys, 10_000);
                (t, targets)
            },
            |(mut t, targets)| {
                for k in targets {
                    let _ = t.put(k, 0).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("table::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let (t, keys) = filled(5, 110_000);
                let targets = sample(&keys, 10_000);
                (t, targets)
            },
            |(mut t, targets)| {
                for k in &targets {
                    let _ = t.remove(k);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("table::get_hit_10k_on_100k", |b| {
        let (t, keys) = filled(7, 100_000);
        let queries = sample(&keys, 10_000);
        b.iter(|| {
            for k in &queries {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("table::get_miss_10k_on_100k", |b| {
        let (t, _) = filled(11, 100_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                if let Some(x) = miss.next() {
                    black_box(t.get(&key(x)));
                }
            }
        })
    });
}

fn bench_iterate_100k(c: &mut Criterion) {
    c.bench_function("table::iter_all_100k", |b| {
        let (t, _) = filled(999, 100_000);
        b.iter(|| {
            let mut sum = 0u64;
            for e in t.iter() {
                sum = sum.wrapping_add(*e.value());
            }
            black_box(sum)
        })
    });

    c.bench_function("table::begin_next_all_100k", |b| {
        let (t, _) = filled(1001, 100_000);
        b.iter(|| {
            let mut n = 0usize;
            let mut cur = t.begin();
            while let Some(h) = cur {
                n += 1;
                cur = t.next(h);
            }
            black_box(n)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_put;
    config = bench_config();
    targets = bench_put_fresh_100k, bench_put_presized_100k, bench_put_update_10k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_remove_random_10k,
              bench_get_hit_10k,
              bench_get_miss_10k,
              bench_iterate_100k
}
criterion_main!(benches_put, benches_ops);
