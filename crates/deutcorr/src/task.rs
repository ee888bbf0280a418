use auto_ops::impl_op_ex;
use deutcorr_core::{DeutcorrResult, Event, PidResponse, TriggerClass};
use deutcorr_pid::DeuteronSelector;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    config::AnalysisConfig,
    correlator::correlate,
    output::{HistogramSet, Sink},
    selection::{fill_single_track, select_event},
};

/// Counts describing what happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventSummary {
    /// Tracks passing quality cuts, acceptance, and the TPC requirement.
    pub n_accepted: usize,
    /// Identified deuterons.
    pub n_deuterons: usize,
    /// Triggers with $`p_T \ge 5`$ GeV/$`c`$.
    pub n_triggers_low: usize,
    /// Triggers with $`p_T \ge 8`$ GeV/$`c`$.
    pub n_triggers_high: usize,
    /// Trigger-deuteron pairs filled, summed over both trigger classes.
    pub n_pairs: usize,
}

/// Counts accumulated over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Events which were processed and filled.
    pub n_events: usize,
    /// Events which were rejected as a whole.
    pub n_skipped: usize,
    /// Identified deuterons in processed events.
    pub n_deuterons: usize,
    /// Trigger-deuteron pairs filled.
    pub n_pairs: usize,
}

impl RunSummary {
    fn record(&mut self, result: &DeutcorrResult<EventSummary>) {
        match result {
            Ok(summary) => {
                self.n_events += 1;
                self.n_deuterons += summary.n_deuterons;
                self.n_pairs += summary.n_pairs;
            }
            Err(_) => self.n_skipped += 1,
        }
    }
}

impl_op_ex!(+ |a: &RunSummary, b: &RunSummary| -> RunSummary {
    RunSummary {
        n_events: a.n_events + b.n_events,
        n_skipped: a.n_skipped + b.n_skipped,
        n_deuterons: a.n_deuterons + b.n_deuterons,
        n_pairs: a.n_pairs + b.n_pairs,
    }
});

/// The deuteron-trigger correlation analysis.
///
/// The configuration is fixed at construction. Events are independent, so a task may be shared
/// between threads and events processed in any order; only the sinks see the results.
#[derive(Debug, Clone)]
pub struct CorrelationTask<P: PidResponse> {
    config: AnalysisConfig,
    selector: DeuteronSelector,
    pid: P,
}

impl<P: PidResponse> CorrelationTask<P> {
    /// Validate `config` and build a task using `pid` for detector responses.
    pub fn new(config: AnalysisConfig, pid: P) -> DeutcorrResult<Self> {
        config.validate()?;
        let selector = config.selector()?;
        info!(
            cut_width = config.cut_width,
            curve_form = %config.curve_form,
            max_candidates = ?config.max_candidates,
            "configured deuteron correlation task"
        );
        Ok(Self {
            config,
            selector,
            pid,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The deuteron classifier in use.
    pub fn selector(&self) -> &DeuteronSelector {
        &self.selector
    }

    /// The PID response in use.
    pub fn pid(&self) -> &P {
        &self.pid
    }

    /// Select, fill single-track spectra, and correlate one event.
    ///
    /// If the selection fails (too many candidates) nothing of the event is filled and the error
    /// is returned.
    pub fn process_event<S: Sink + ?Sized>(
        &self,
        event: &Event,
        sink: &mut S,
    ) -> DeutcorrResult<EventSummary> {
        let selection = select_event(
            event,
            &self.pid,
            &self.selector,
            self.config.max_candidates,
        )?;
        fill_single_track(&selection, sink);
        let n_pairs = correlate(event, &selection, sink);
        let summary = EventSummary {
            n_accepted: selection.accepted.len(),
            n_deuterons: selection.n_deuterons(),
            n_triggers_low: selection.triggers(TriggerClass::Low).len(),
            n_triggers_high: selection.triggers(TriggerClass::High).len(),
            n_pairs,
        };
        debug!(
            accepted = summary.n_accepted,
            deuterons = summary.n_deuterons,
            triggers_05 = summary.n_triggers_low,
            triggers_08 = summary.n_triggers_high,
            pairs = summary.n_pairs,
            "processed event"
        );
        Ok(summary)
    }

    fn accumulate(
        &self,
        index: usize,
        event: &Event,
        set: &mut HistogramSet,
        run: &mut RunSummary,
    ) {
        let result = self.process_event(event, set);
        if let Err(err) = &result {
            warn!("skipping event {index}: {err}");
        }
        run.record(&result);
    }

    /// Process every event into a fresh [`HistogramSet`], returning it with the run counts.
    ///
    /// Events which fail selection are skipped. With the `rayon` feature the events are spread
    /// over the global thread pool and the per-thread sets are merged at the end.
    pub fn process_events_with_summary(&self, events: &[Event]) -> (HistogramSet, RunSummary) {
        #[cfg(feature = "rayon")]
        let (set, run) = events
            .par_iter()
            .enumerate()
            .fold(
                || (HistogramSet::new(), RunSummary::default()),
                |(mut set, mut run), (index, event)| {
                    self.accumulate(index, event, &mut set, &mut run);
                    (set, run)
                },
            )
            .reduce(
                || (HistogramSet::new(), RunSummary::default()),
                |(mut a, run_a), (b, run_b)| {
                    a.merge(&b);
                    (a, run_a + run_b)
                },
            );
        #[cfg(not(feature = "rayon"))]
        let (set, run) = {
            let mut set = HistogramSet::new();
            let mut run = RunSummary::default();
            for (index, event) in events.iter().enumerate() {
                self.accumulate(index, event, &mut set, &mut run);
            }
            (set, run)
        };
        info!(
            events = run.n_events,
            skipped = run.n_skipped,
            deuterons = run.n_deuterons,
            pairs = run.n_pairs,
            "finished processing events"
        );
        (set, run)
    }

    /// Process every event into a fresh [`HistogramSet`].
    pub fn process_events(&self, events: &[Event]) -> HistogramSet {
        self.process_events_with_summary(events).0
    }
}
