use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use objkit_merge::{deep_clone, merge_with, ArrayStrategy, MergeOptions};
use objkit_types::{Graph, Value};
use serde_json::json;

fn user(i: usize) -> serde_json::Value {
    json!({
        "id": i,
        "name": format!("user{i}"),
        "role": "developer",
        "salary": 50_000 + i,
        "tags": ["a", "b", format!("t{}", i % 7)],
        "address": {"city": "Springfield", "zip": format!("{:05}", i)}
    })
}

fn bench_simple(c: &mut Criterion) {
    let mut graph = Graph::new();
    let base = graph.ingest(&user(1));
    let update = graph.ingest(&json!({"role": "senior developer", "salary": 60_000}));

    c.bench_function("merge/simple", |b| {
        b.iter(|| {
            let mut g = graph.clone();
            merge_with(&mut g, black_box(&base), &[update.clone()], &MergeOptions::default())
        })
    });
}

fn bench_deep_vs_shallow(c: &mut Criterion) {
    let mut graph = Graph::new();
    let target = graph.ingest(&json!({
        "user": user(1),
        "settings": {"theme": "dark", "notifications": true},
        "metadata": {"version": 1}
    }));
    let source = graph.ingest(&json!({
        "settings": {"language": "en", "notifications": false},
        "metadata": {"updated": 2}
    }));

    let mut group = c.benchmark_group("merge/nested");
    for (name, options) in [
        ("deep", MergeOptions::default()),
        ("shallow", MergeOptions::shallow()),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut g = graph.clone();
                merge_with(&mut g, &target, &[source.clone()], &options)
            })
        });
    }
    group.finish();
}

fn bench_array_strategies(c: &mut Criterion) {
    let mut graph = Graph::new();
    let target = graph.ingest(&json!({"users": (0..200).map(user).collect::<Vec<_>>()}));
    let source = graph.ingest(&json!({"users": (100..300).map(user).collect::<Vec<_>>()}));

    let mut group = c.benchmark_group("merge/arrays");
    for strategy in ArrayStrategy::ALL {
        let options = MergeOptions::with_arrays(strategy);
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &options, |b, options| {
            b.iter(|| {
                let mut g = graph.clone();
                merge_with(&mut g, &target, &[source.clone()], options)
            })
        });
    }
    group.finish();
}

fn bench_cyclic_clone(c: &mut Criterion) {
    let mut graph = Graph::new();
    let root = graph.mapping();
    for i in 0..100 {
        let child = graph.ingest(&user(i));
        if let Value::Node(id) = child {
            graph.set(id, "parent", Value::Node(root)).ok();
        }
        graph.set(root, &format!("u{i}"), child).ok();
    }

    c.bench_function("clone/cyclic", |b| {
        b.iter(|| {
            let mut g = graph.clone();
            deep_clone(&mut g, black_box(&Value::Node(root)))
        })
    });
}

criterion_group!(
    benches,
    bench_simple,
    bench_deep_vs_shallow,
    bench_array_strategies,
    bench_cyclic_clone
);
criterion_main!(benches);
