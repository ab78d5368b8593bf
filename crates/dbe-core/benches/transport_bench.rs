// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Transport Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use dbe_core::pedestal::PedestalModel;
use dbe_core::transport::TransportModel;
use dbe_types::config::PlasmaConfig;
use std::hint::black_box;

fn bench_transport_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("dbe_transport_step");
    let model = TransportModel::new(PlasmaConfig::default()).expect("default config must be valid");

    group.bench_function("single_step", |b| {
        b.iter_batched(
            || model.initialize().expect("initialize should succeed"),
            |mut state| {
                model
                    .step(&mut state, 2e-4, 0.5, 10.0, 0.5)
                    .expect("step should succeed");
                black_box(state.temperature[0]);
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("event_advance_with_elm_check", |b| {
        b.iter_batched(
            || {
                (
                    model.initialize().expect("initialize should succeed"),
                    PedestalModel::new(model.config()),
                )
            },
            |(mut state, mut pedestal)| {
                model.advance(&mut state).expect("advance should succeed");
                black_box(pedestal.check_elm_trigger(&mut state, 1.5));
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_transport_step);
criterion_main!(benches);
