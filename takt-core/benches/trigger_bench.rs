#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};

use takt_core::{IntervalTrigger, Micros};

/// Cost of one poll on the hot path of a loop, both when nothing is due and
/// when every poll crosses a boundary.
fn bench_has_elapsed(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_elapsed");

    group.bench_function("idle", |b| {
        let mut trigger = IntervalTrigger::new(Micros::from_secs(3600)).unwrap();
        trigger.start_next(Micros::ZERO);
        let mut now = 0;
        b.iter(|| {
            now += 1;
            black_box(trigger.has_elapsed(Micros::from_micros(now)));
        });
    });

    group.bench_function("firing", |b| {
        let mut trigger = IntervalTrigger::new(Micros::from_micros(1)).unwrap();
        trigger.start(Micros::ZERO);
        let mut now = 0;
        b.iter(|| {
            now += 1;
            black_box(trigger.has_elapsed(Micros::from_micros(now)));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_has_elapsed);
criterion_main!(benches);
