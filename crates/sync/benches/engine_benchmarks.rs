use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use statekeeper_core::{GameState, InventoryItem, StateUpdate};
use statekeeper_sync::{ListenerError, SyncEngine};

fn items(n: usize) -> Vec<InventoryItem> {
    (0..n)
        .map(|i| InventoryItem::new(format!("Item {i}"), 1).unwrap())
        .collect()
}

fn engine_with_listeners(n: usize) -> SyncEngine {
    let engine = SyncEngine::new();
    for _ in 0..n {
        engine.add_listener(|state: &GameState, _: &StateUpdate| {
            black_box(state.inventory().len());
            Ok::<(), ListenerError>(())
        });
    }
    engine
}

/// Noop updates dominate a polling producer and must stay cheap.
fn bench_noop_fast_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_update");
    let engine = engine_with_listeners(3);

    group.bench_function("noop", |b| {
        b.iter(|| engine.process_update(black_box(StateUpdate::noop("plain gameplay"))));
    });

    group.bench_function("unchanged_location", |b| {
        engine.process_update(StateUpdate::location("Limgrave", ""));
        b.iter(|| engine.process_update(black_box(StateUpdate::location("Limgrave", ""))));
    });

    let mut toggle = false;
    group.bench_function("changed_location", |b| {
        b.iter(|| {
            toggle = !toggle;
            let area = if toggle { "Limgrave" } else { "Caelid" };
            engine.process_update(black_box(StateUpdate::location(area, "")))
        });
    });

    group.finish();
}

fn bench_inventory_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_replace");

    for size in [1usize, 16, 128] {
        let engine = engine_with_listeners(1);
        let snapshot = items(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| engine.process_update(StateUpdate::inventory(snapshot.clone(), "")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_noop_fast_path, bench_inventory_replace);
criterion_main!(benches);
