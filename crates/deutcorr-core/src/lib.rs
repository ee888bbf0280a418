//! # deutcorr-core
//!
//! This is an internal crate used by `deutcorr`.
#![warn(clippy::perf, clippy::style)]
#![allow(clippy::excessive_precision)]

use thiserror::Error;

/// The [`Track`] and [`Event`] records consumed by the analysis.
pub mod data;
/// Fixed-binning histograms used as accumulation sinks.
pub mod histogram;
/// The particle-identification response interface and a kinematic implementation of it.
pub mod pid;
/// Utility functions, enums, and angle helpers
pub mod utils;

pub use crate::data::{CandidateList, Event, Track};
pub use crate::histogram::{Binning, Histogram1D, Histogram2D};
pub use crate::pid::{KinematicPidResponse, PidResponse};
pub use crate::utils::angles::{normalize_phi, signed_delta_phi};
pub use crate::utils::enums::{CandidateCategory, Detector, PidStatus, Sign, Species, TriggerClass};

/// The ratio of a circle's circumference to its radius.
pub const PI: f64 = std::f64::consts::PI;

/// The speed of light in m/ns.
pub const C_M_PER_NS: f64 = 0.299792458;

/// The speed of light in cm/ns.
pub const C_CM_PER_NS: f64 = 29.9792458;

/// Shorthand for results carrying a [`DeutcorrError`].
pub type DeutcorrResult<T> = Result<T, DeutcorrError>;

/// The error type used by all `deutcorr` internal methods
#[derive(Error, Debug)]
pub enum DeutcorrError {
    /// An alias for [`std::io::Error`].
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    /// An alias for [`serde_json::Error`].
    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// An error which occurs when the user tries to parse an invalid string of text, typically
    /// into an enum variant.
    #[error("Failed to parse string: \"{name}\" does not correspond to a valid \"{object}\"!")]
    ParseError {
        /// The string which was parsed
        name: String,
        /// The name of the object it failed to parse into
        object: String,
    },
    /// A calibration-curve table which cannot be evaluated (non-finite coefficients).
    #[error("Invalid calibration table: {reason}")]
    InvalidCalibration {
        /// What is wrong with the table
        reason: String,
    },
    /// An analysis configuration which cannot be used to process events.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration
        reason: String,
    },
    /// More candidates of one category were found in a single event than the configured
    /// capacity allows.
    #[error("Too many {category} candidates in one event (capacity {capacity})")]
    CapacityExceeded {
        /// The candidate list which overflowed
        category: CandidateCategory,
        /// The configured capacity of that list
        capacity: usize,
    },
    /// A custom fallback error for errors too complex or too infrequent to warrant their own error
    /// category.
    #[error("{0}")]
    Custom(String),
}

impl Clone for DeutcorrError {
    // error types are rarely cloneable, but per-event results get collected and copied around
    fn clone(&self) -> Self {
        let err_string = self.to_string();
        DeutcorrError::Custom(err_string)
    }
}

impl DeutcorrError {
    /// Returns `true` for errors which only invalidate the current event rather than the run.
    pub fn is_event_level(&self) -> bool {
        matches!(self, DeutcorrError::CapacityExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_error_message() {
        let err = DeutcorrError::CapacityExceeded {
            category: CandidateCategory::Deuteron,
            capacity: 20,
        };
        assert_eq!(
            err.to_string(),
            "Too many deuteron candidates in one event (capacity 20)"
        );
        assert!(err.is_event_level());
    }

    #[test]
    fn clone_keeps_message() {
        let err = DeutcorrError::InvalidConfig {
            reason: "cut width must be positive".to_string(),
        };
        let cloned = err.clone();
        assert_eq!(cloned.to_string(), err.to_string());
        assert!(!cloned.is_event_level());
    }
}
