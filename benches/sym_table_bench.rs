use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;
use symtable::{Growth, SymTable};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(growth: Growth, seed: u64, n: usize) -> (SymTable<u64>, Vec<String>) {
    let mut t = SymTable::with_growth(growth);
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.put(k, i as u64).unwrap();
    }
    (t, keys)
}

fn bench_put_fresh_20k(c: &mut Criterion) {
    for (name, growth) in [("rehash", Growth::Rehash), ("fixed", Growth::Fixed)] {
        let keys: Vec<String> = lcg(1).take(20_000).map(key).collect();
        c.bench_function(&format!("symtable::{name}::put_fresh_20k"), |b| {
            b.iter_batched(
                || SymTable::<u64>::with_growth(growth),
                |mut t| {
                    for (i, k) in keys.iter().enumerate() {
                        let _ = t.put(k, i as u64);
                    }
                    black_box(t)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_get_hit_10k(c: &mut Criterion) {
    for (name, growth) in [("rehash", Growth::Rehash), ("fixed", Growth::Fixed)] {
        let (t, keys) = filled(growth, 7, 20_000);
        // Precompute 10k random query keys using LCG
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].clone()
            })
            .collect();
        c.bench_function(&format!("symtable::{name}::get_hit_10k_on_20k"), |b| {
            b.iter(|| {
                for k in &queries {
                    black_box(t.get(k));
                }
            })
        });
    }
}

fn bench_get_miss_10k(c: &mut Criterion) {
    let (t, _) = filled(Growth::Rehash, 11, 20_000);
    c.bench_function("symtable::rehash::get_miss_10k_on_20k", |b| {
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = key(miss.next().unwrap());
                black_box(t.contains(&k));
            }
        })
    });
}

fn bench_remove_all_20k(c: &mut Criterion) {
    c.bench_function("symtable::rehash::remove_all_20k", |b| {
        b.iter_batched(
            || filled(Growth::Rehash, 5, 20_000),
            |(mut t, keys)| {
                for k in keys.iter().rev() {
                    black_box(t.remove(k));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_traverse_20k(c: &mut Criterion) {
    let (t, _) = filled(Growth::Rehash, 999, 20_000);
    c.bench_function("symtable::rehash::for_each_20k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            t.for_each_with(&mut sum, |_, v, acc| *acc = acc.wrapping_add(*v));
            black_box(sum)
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
    targets = bench_put_fresh_20k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k,
              bench_get_miss_10k,
              bench_remove_all_20k,
              bench_traverse_20k
}
criterion_main!(benches_put, benches_ops);
