use std::{env, time::Instant};

use deutcorr::{
    AnalysisConfig, CorrelationTask, DeutcorrResult, EventGenerator, HistogramId,
    KinematicPidResponse, PairCharge, TriggerClass,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_EVENTS: usize = 10_000;
const SEED: u64 = 11;

fn usage() {
    eprintln!("Usage: cargo run --release --bin profile_events -- [n_events] [config.json]");
}

fn run(n_events: usize, config: AnalysisConfig) -> DeutcorrResult<()> {
    let mut generator = EventGenerator::new(SEED, &config)?;
    let start = Instant::now();
    let events = generator.generate_n(n_events);
    info!(
        events = n_events,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "generated events"
    );

    let task = CorrelationTask::new(config, KinematicPidResponse::default())?;
    let start = Instant::now();
    let (histograms, run) = task.process_events_with_summary(&events);
    let elapsed = start.elapsed();
    let per_event_ns = elapsed.as_nanos() as f64 / n_events.max(1) as f64;
    eprintln!(
        "events={} skipped={} deuterons={} pairs={} total_ms={} avg_ns_per_event={:.1}",
        run.n_events,
        run.n_skipped,
        run.n_deuterons,
        run.n_pairs,
        elapsed.as_millis(),
        per_event_ns
    );
    if let Some(multiplicity) = histograms.get_1d(HistogramId::DeuteronsPerEvent) {
        eprintln!("deuterons per event: {:?}", multiplicity.counts());
    }
    for class in TriggerClass::ALL {
        for pair in PairCharge::ALL {
            let id = HistogramId::Correlation { class, pair };
            if let Some(h) = histograms.get_2d(id) {
                eprintln!("{:<28} entries={}", id.name(), h.entries());
            }
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args: Vec<String> = env::args().collect();
    let n_events = match args.get(1).map(|raw| raw.parse::<usize>()) {
        None => DEFAULT_EVENTS,
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            usage();
            std::process::exit(2);
        }
    };
    let config = match args.get(2) {
        None => AnalysisConfig::default(),
        Some(path) => match AnalysisConfig::from_json_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load {path}: {err}");
                std::process::exit(2);
            }
        },
    };
    if let Err(err) = run(n_events, config) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
