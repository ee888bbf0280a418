use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use deutcorr::{
    select_event, AnalysisConfig, CorrelationTask, EventGenerator, HistogramSet,
    KinematicPidResponse,
};
use rayon::ThreadPoolBuilder;

fn selection_benchmark(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let events = EventGenerator::new(0, &config).unwrap().generate_n(1000);
    let selector = config.selector().unwrap();
    let pid = KinematicPidResponse::default();
    c.bench_function("select 1000 events", |b| {
        b.iter(|| {
            for event in &events {
                black_box(select_event(event, &pid, &selector, None).unwrap());
            }
        });
    });
}

fn event_loop_benchmark(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let mut generator = EventGenerator::new(1, &config).unwrap();
    let task = CorrelationTask::new(config, KinematicPidResponse::default()).unwrap();
    let mut group = c.benchmark_group("event loop");
    let n_threads: Vec<usize> = (0..)
        .map(|x| 1 << x)
        .take_while(|&p| p <= num_cpus::get())
        .collect();
    for threads in n_threads {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |b, &_threads| {
                b.iter_batched(
                    || generator.generate_n(2000),
                    |events| pool.install(|| black_box(task.process_events(&events))),
                    BatchSize::LargeInput,
                )
            },
        );
    }
    group.finish();
}

fn serial_fill_benchmark(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let events = EventGenerator::new(2, &config).unwrap().generate_n(1000);
    let task = CorrelationTask::new(config, KinematicPidResponse::default()).unwrap();
    c.bench_function("process 1000 events into one set", |b| {
        b.iter_batched(
            HistogramSet::new,
            |mut set| {
                for event in &events {
                    task.process_event(event, &mut set).unwrap();
                }
                black_box(set)
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = selection_benchmark, event_loop_benchmark, serial_fill_benchmark
}
criterion_main!(benches);
