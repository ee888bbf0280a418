//! # deutcorr-pid
//!
//! This is an internal crate used by `deutcorr`.
#![warn(clippy::perf, clippy::style)]
#![allow(clippy::excessive_precision)]

/// Momentum-dependent calibration curves for the squared-mass window.
pub mod curves;
/// Species selection: band cut, mass window, and the staged classifier.
pub mod selection;
/// Time-of-flight observables (velocity, pion time residual, squared mass).
pub mod tof;

pub use curves::{CalibrationCurve, CurveForm, CurvePair, CurveTable};
pub use selection::{passes_band_cut, DeuteronSelector, SelectionStage, MOMENTUM_WINDOW};
pub use tof::TofObservables;
