//! Benchmarks for reducers and store dispatch

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ducklings_core::{Action, Dispatcher};
use ducklings_resolve::resolve;
use ducklings_store::Store;
use ducklings_test::fixtures;

fn bench_reduce_flat(c: &mut Criterion) {
    let Ok(resolved) = resolve(&fixtures::decrementer_incrementer_toggle()) else {
        return;
    };
    let action = Action::new("INCREMENT");
    let state = resolved.initial_state.clone();

    c.bench_function("reduce_flat", |b| {
        b.iter(|| black_box(resolved.reducer.reduce(Some(state.clone()), black_box(&action))))
    });
}

fn bench_reduce_keyed_miss(c: &mut Criterion) {
    let Ok(resolved) = resolve(&fixtures::nested_incrementers(4, 4)) else {
        return;
    };
    let action = Action::new("UNKNOWN");
    let state = resolved.initial_state.clone();

    c.bench_function("reduce_keyed_miss", |b| {
        b.iter(|| black_box(resolved.reducer.reduce(Some(state.clone()), black_box(&action))))
    });
}

fn bench_store_dispatch(c: &mut Criterion) {
    let Ok(resolved) = resolve(&fixtures::multiple_incrementers()) else {
        return;
    };
    let store = Store::from_resolved(&resolved);
    let action = Action::new("incrementer1/INCREMENT");

    c.bench_function("store_dispatch", |b| {
        b.iter(|| store.dispatch(black_box(action.clone()).into()))
    });
}

fn bench_fan_out_reset(c: &mut Criterion) {
    let Ok(resolved) = resolve(&fixtures::nested_incrementers(4, 4)) else {
        return;
    };
    let store = Store::from_resolved(&resolved);
    let Some(reset) = resolved.app.get("reset") else {
        return;
    };

    c.bench_function("fan_out_reset", |b| b.iter(|| store.invoke(reset, &[])));
}

criterion_group!(
    benches,
    bench_reduce_flat,
    bench_reduce_keyed_miss,
    bench_store_dispatch,
    bench_fan_out_reset,
);
criterion_main!(benches);
