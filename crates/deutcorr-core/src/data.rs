use std::{fmt::Display, ops::Deref};

use serde::{Deserialize, Serialize};

use crate::{utils::enums::CandidateCategory, DeutcorrError, DeutcorrResult, Sign};

/// A reconstructed charged-particle track.
///
/// Signals are stored as the detectors report them: the TPC signal in arbitrary dE/dx units, the
/// TOF stop signal in ps, and the integrated track length in cm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Track {
    /// Transverse momentum (GeV/$`c`$).
    pub pt: f64,
    /// Total momentum (GeV/$`c`$).
    pub p: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle as reconstructed (rad, not folded).
    pub phi: f64,
    /// Electric charge in units of $`e`$.
    pub charge: i16,
    /// Specific ionization in the TPC.
    pub tpc_signal: f64,
    /// TOF stop time (ps).
    pub tof_signal: f64,
    /// Integrated track length from the primary vertex to the TOF (cm).
    pub length: f64,
    /// Whether the track passes the hybrid (global + constrained global) track selection.
    pub hybrid: bool,
    /// Whether the track is a primary-vertex candidate.
    pub primary_candidate: bool,
}

impl Track {
    /// Build a track from its kinematics with all quality flags set and no detector signals.
    pub fn from_kinematics(pt: f64, eta: f64, phi: f64, charge: i16) -> Self {
        Self {
            pt,
            p: pt * eta.cosh(),
            eta,
            phi,
            charge,
            hybrid: true,
            primary_candidate: true,
            ..Default::default()
        }
    }

    /// Attach TPC and TOF signals and the integrated length.
    pub fn with_signals(mut self, tpc_signal: f64, tof_signal: f64, length: f64) -> Self {
        self.tpc_signal = tpc_signal;
        self.tof_signal = tof_signal;
        self.length = length;
        self
    }

    /// The charge sign, or [`None`] for a neutral track.
    pub fn sign(&self) -> Option<Sign> {
        Sign::from_charge(self.charge)
    }
}

impl Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Track(pt = {:.3}, p = {:.3}, eta = {:.3}, phi = {:.3}, q = {})",
            self.pt, self.p, self.eta, self.phi, self.charge
        )
    }
}

/// One collision event as delivered by the event source.
///
/// Track slots are indexed as in the source; a `None` slot stands for a track which could not be
/// reconstructed and is skipped by the analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Tracks by index.
    pub tracks: Vec<Option<Track>>,
    /// Centrality percentile from the forward multiplicity estimator, if available.
    pub centrality: Option<f64>,
}

impl Event {
    /// An event where every track slot is reconstructed.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: tracks.into_iter().map(Some).collect(),
            centrality: None,
        }
    }

    /// Set the centrality percentile.
    pub fn with_centrality(mut self, centrality: f64) -> Self {
        self.centrality = Some(centrality);
        self
    }

    /// Number of track slots (including unreconstructed ones).
    pub fn n_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// The track at `index`, if that slot holds a reconstructed track.
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index).and_then(Option::as_ref)
    }

    /// Iterate over `(index, track)` for reconstructed tracks.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Track)> + '_ {
        self.tracks
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (i, t)))
    }
}

/// An ordered list of track indices belonging to one candidate category within one event.
///
/// The list grows as needed unless built with
/// [`with_capacity_limit`](CandidateList::with_capacity_limit), in which case pushing beyond the
/// limit is reported as [`DeutcorrError::CapacityExceeded`] and the list is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    category: CandidateCategory,
    indices: Vec<usize>,
    limit: Option<usize>,
}

impl CandidateList {
    /// An empty, growable list.
    pub fn new(category: CandidateCategory) -> Self {
        Self {
            category,
            indices: Vec::new(),
            limit: None,
        }
    }

    /// An empty list which holds at most `limit` indices.
    pub fn with_capacity_limit(category: CandidateCategory, limit: usize) -> Self {
        Self {
            category,
            indices: Vec::with_capacity(limit),
            limit: Some(limit),
        }
    }

    /// An empty list with an optional limit.
    pub fn with_optional_limit(category: CandidateCategory, limit: Option<usize>) -> Self {
        match limit {
            Some(limit) => Self::with_capacity_limit(category, limit),
            None => Self::new(category),
        }
    }

    /// Append a track index, preserving insertion order.
    pub fn push(&mut self, index: usize) -> DeutcorrResult<()> {
        if let Some(limit) = self.limit {
            if self.indices.len() >= limit {
                return Err(DeutcorrError::CapacityExceeded {
                    category: self.category,
                    capacity: limit,
                });
            }
        }
        self.indices.push(index);
        Ok(())
    }

    /// The category of candidates held by this list.
    pub fn category(&self) -> CandidateCategory {
        self.category
    }

    /// The configured limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl Deref for CandidateList {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.indices
    }
}

/// An event that can be used to test the analysis. It holds a $`p_T = 6`$ GeV/$`c`$ positive
/// trigger at $`\phi = 0`$, a heavy positive track at $`\phi = \pi/2`$, an unreconstructed
/// slot, and a track outside the $`\eta`$ acceptance.
pub fn test_event() -> Event {
    Event {
        tracks: vec![
            Some(Track::from_kinematics(6.0, 0.1, 0.0, 1).with_signals(45.0, 12_470.0, 370.0)),
            Some(Track::from_kinematics(2.5, 0.2, std::f64::consts::FRAC_PI_2, 1).with_signals(
                80.0,
                15_760.0,
                372.0,
            )),
            None,
            Some(Track::from_kinematics(1.0, 1.2, 1.0, -1).with_signals(50.0, 14_000.0, 420.0)),
        ],
        centrality: Some(42.0),
    }
}
