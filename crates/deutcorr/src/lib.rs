//! `deutcorr` is a library for identifying deuterons with the ALICE time-of-flight detector and
//! correlating them in azimuth with high-$`p_T`$ trigger particles from the same event.
//!
//! <div class="warning">
//!
//! This crate is still in an early development phase, and the API is not stable.
//!
//! </div>
//!
//! # Overview
//! Each event is handled in three steps:
//! 1. [`select_event`] applies the track quality cuts and the $`|\eta| \le 0.8`$ acceptance,
//!    collects triggers above $`p_T = 5`$ and $`8`$ GeV/$`c`$, and classifies every charged track
//!    with a usable TOF signal with the [`DeuteronSelector`].
//! 2. [`fill_single_track`] fills the single-track spectra ($`m^2`$, $`\beta`$, $`\Delta t`$,
//!    $`\phi`$-$`\eta`$ maps, and the deuteron multiplicity).
//! 3. [`correlate`] fills the folded $`\Delta\phi`$ of every trigger-deuteron pair, keyed by
//!    trigger threshold and charge combination.
//!
//! A [`CorrelationTask`] runs all three for a slice of [`Event`]s and returns a [`HistogramSet`].
//!
//! # Deuteron identification
//! For a track with momentum $`p`$, measured flight time $`t`$, and expected pion flight time
//! $`t_\pi`$, the squared mass is
//! ```math
//! m^2 = p^2 \left(\frac{t^2}{t_\pi^2} - 1\right)
//! ```
//! A track is a deuteron if it lies inside an empirical band in TPC dE/dx versus
//! $`\Delta t = t - t_\pi`$ and, for $`1.0 \le p < 4.4`$ GeV/$`c`$, if $`m^2`$ lies strictly within
//! `cut_width` calibrated sigmas of the calibrated peak for its charge sign.
//!
//! # Quick Start
//! ```rust
//! use deutcorr::{
//!     AnalysisConfig, CorrelationTask, EventGenerator, HistogramId, KinematicPidResponse,
//! };
//!
//! let config = AnalysisConfig::default();
//! let events = EventGenerator::new(0, &config).unwrap().generate_n(100);
//! let task = CorrelationTask::new(config, KinematicPidResponse::default()).unwrap();
//! let histograms = task.process_events(&events);
//! let multiplicity = histograms.get_1d(HistogramId::DeuteronsPerEvent).unwrap();
//! assert_eq!(multiplicity.entries(), 100);
//! ```
//!
//! # Configuration
//! An [`AnalysisConfig`] can be read from JSON, where any omitted field keeps its default:
//! ```json
//! { "cut_width": 3.0, "curve_form": "InverseSqrt", "max_candidates": 20 }
//! ```
#![warn(clippy::perf, clippy::style, missing_docs)]

/// Analysis settings.
pub mod config;
/// Trigger-deuteron pair accumulation.
pub mod correlator;
/// Synthetic events with consistent detector signals.
pub mod generator;
/// Histogram identities, the [`Sink`] interface, and the in-memory [`HistogramSet`].
pub mod output;
/// The per-event selection pass and single-track fills.
pub mod selection;
/// The analysis driver.
pub mod task;

#[cfg(test)]
mod testing;

/// Track and event records.
pub mod data {
    pub use deutcorr_core::data::*;
}

/// Particle identification: detector responses, TOF observables, and the deuteron classifier.
pub mod pid {
    pub use deutcorr_core::pid::*;
    pub use deutcorr_pid::curves::*;
    pub use deutcorr_pid::selection::*;
    pub use deutcorr_pid::tof::*;
}

/// Utility functions, enums, and histograms
pub mod utils {
    pub use deutcorr_core::histogram;
    pub use deutcorr_core::utils::*;
}

pub use config::AnalysisConfig;
pub use correlator::correlate;
pub use deutcorr_core::{
    normalize_phi, signed_delta_phi, Binning, CandidateCategory, CandidateList, DeutcorrError,
    DeutcorrResult, Detector, Event, Histogram1D, Histogram2D, KinematicPidResponse, PidResponse,
    PidStatus, Sign, Species, Track, TriggerClass, PI,
};
pub use deutcorr_pid::{
    passes_band_cut, CalibrationCurve, CurveForm, CurvePair, CurveTable, DeuteronSelector,
    SelectionStage, TofObservables, MOMENTUM_WINDOW,
};
pub use generator::{EventGenerator, TrackFactory};
pub use output::{HistogramId, HistogramSet, PairCharge, SharedSink, Sink};
pub use selection::{fill_single_track, select_event, AcceptedTrack, EventSelection};
pub use serde::{Deserialize, Serialize};
pub use task::{CorrelationTask, EventSummary, RunSummary};
