#[path = "../tests/fixtures/mod.rs"]
mod fixtures;

use crate::fixtures::{GRANULARITY, load_reference_bars, tick_sequence};

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use std::{hint::black_box, num::NonZero, time::Duration};
use trendwave::{BarAggregator, Tick, WaveConfig, WaveEngine};

fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).expect("non zero value")
}

fn loaded(window: usize) -> (BarAggregator, WaveEngine) {
    let bars = load_reference_bars();
    let mut agg = BarAggregator::new(NonZero::new(GRANULARITY).expect("non zero"), nz(5_000));
    agg.ingest_history(bars);
    let mut engine = WaveEngine::new(WaveConfig::with_window(nz(window)), nz(5_000));
    engine.recompute(&agg);
    (agg, engine)
}

fn recompute_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute");
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(10));

    for window in [20, 200] {
        let (agg, engine) = loaded(window);
        group.throughput(Throughput::Elements(agg.len() as u64));
        group.bench_function(format!("wave{window}"), |b| {
            b.iter_batched(
                || engine.clone(),
                |mut engine| black_box(engine.recompute(&agg)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn tick_benchmarks(c: &mut Criterion) {
    let bars = load_reference_bars();
    let mut group = c.benchmark_group("tick");
    group.sample_size(200);
    group.noise_threshold(0.03);
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(10));

    // Updates the newest bar in place.
    let update = tick_sequence(bars.last().expect("fixture bars"))[2].clone();
    // Opens the bucket after the newest bar.
    let append = Tick::new(update.epoch() + GRANULARITY, update.quote(), update.symbol());

    for window in [20, 200] {
        let state = loaded(window);

        for (name, tick) in [("update", &update), ("append", &append)] {
            group.bench_function(format!("wave{window}/{name}"), |b| {
                b.iter_batched(
                    || state.clone(),
                    |(mut agg, mut engine)| {
                        let outcome = agg.ingest_tick(tick);
                        black_box(engine.update_last(&agg, &outcome))
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group!(benches, recompute_benchmarks, tick_benchmarks);
criterion_main!(benches);
