//! Dispatch cost against the number of watched paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dux_core::{create_store, Value};

fn dispatch_by_path_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for paths in [1usize, 16, 256] {
        let initial: Value = (0..paths)
            .map(|i| (format!("k{i}"), Value::map().with("v", 0)))
            .collect();
        let store = create_store(
            |state, kind, payload| Ok(state.with_path(kind, payload.clone())),
            initial,
        );
        for i in 0..paths {
            store.react(format!("k{i}.v"), |v| {
                black_box(v);
            });
        }

        let mut n = 0;
        group.bench_with_input(BenchmarkId::from_parameter(paths), &paths, |b, _| {
            b.iter(|| {
                n += 1;
                store.act("k0.v", n).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, dispatch_by_path_count);
criterion_main!(benches);
