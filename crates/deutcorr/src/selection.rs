use deutcorr_core::{
    normalize_phi, CandidateCategory, CandidateList, DeutcorrResult, Detector, Event, PidResponse,
    Sign, TriggerClass,
};
use deutcorr_pid::{DeuteronSelector, SelectionStage, TofObservables};
use tracing::trace;

use crate::output::{HistogramId, Sink};

/// Largest accepted $`|\eta|`$.
pub const ETA_MAX: f64 = 0.8;

/// Transverse-momentum range (GeV/$`c`$) of tracks entering the $`\phi`$-$`\eta`$ maps.
pub const PHI_ETA_PT_RANGE: std::ops::Range<f64> = 2.0..5.0;

/// A track which passed the quality and acceptance cuts, with everything derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptedTrack {
    /// Index of the track in the event.
    pub index: usize,
    /// Transverse momentum (GeV/$`c`$).
    pub pt: f64,
    /// Total momentum (GeV/$`c`$).
    pub p: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Folded azimuth.
    pub phi: f64,
    /// Charge sign, `None` for neutral tracks.
    pub sign: Option<Sign>,
    /// TOF observables, present only for charged tracks with a usable TOF measurement.
    pub tof: Option<TofObservables>,
    /// How far the track got through the deuteron selection, present alongside `tof`.
    pub stage: Option<SelectionStage>,
}

impl AcceptedTrack {
    /// Whether the track was identified as a deuteron.
    pub fn is_deuteron(&self) -> bool {
        self.stage.is_some_and(|stage| stage.is_deuteron())
    }
}

/// The outcome of the selection pass over one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSelection {
    /// Accepted tracks in event order.
    pub accepted: Vec<AcceptedTrack>,
    /// Indices of identified deuterons.
    pub deuterons: CandidateList,
    /// Indices of tracks with $`p_T \ge 5`$ GeV/$`c`$.
    pub triggers_low: CandidateList,
    /// Indices of tracks with $`p_T \ge 8`$ GeV/$`c`$.
    pub triggers_high: CandidateList,
    /// Number of track slots in the event.
    pub n_tracks: usize,
    /// Centrality percentile of the event.
    pub centrality: Option<f64>,
}

impl EventSelection {
    /// The trigger candidates of `class`.
    pub fn triggers(&self, class: TriggerClass) -> &CandidateList {
        match class {
            TriggerClass::Low => &self.triggers_low,
            TriggerClass::High => &self.triggers_high,
        }
    }

    /// Number of identified deuterons.
    pub fn n_deuterons(&self) -> usize {
        self.deuterons.len()
    }
}

/// Run the quality cuts, acceptance, and deuteron identification over every track of `event`.
///
/// Nothing is filled here. If any candidate list would exceed `max_candidates` the whole event
/// is rejected with
/// [`DeutcorrError::CapacityExceeded`](deutcorr_core::DeutcorrError::CapacityExceeded).
pub fn select_event<P: PidResponse + ?Sized>(
    event: &Event,
    pid: &P,
    selector: &DeuteronSelector,
    max_candidates: Option<usize>,
) -> DeutcorrResult<EventSelection> {
    let mut selection = EventSelection {
        accepted: Vec::new(),
        deuterons: CandidateList::with_optional_limit(CandidateCategory::Deuteron, max_candidates),
        triggers_low: CandidateList::with_optional_limit(
            CandidateCategory::Trigger(TriggerClass::Low),
            max_candidates,
        ),
        triggers_high: CandidateList::with_optional_limit(
            CandidateCategory::Trigger(TriggerClass::High),
            max_candidates,
        ),
        n_tracks: event.n_tracks(),
        centrality: event.centrality,
    };
    for (index, track) in event.iter() {
        let phi = normalize_phi(track.phi);
        if !track.hybrid || track.eta.abs() > ETA_MAX || !track.primary_candidate {
            trace!("track {index} fails quality or acceptance cuts");
            continue;
        }
        if !pid.status(Detector::Tpc, track).is_ok() {
            trace!("track {index} has no usable TPC signal");
            continue;
        }
        if track.pt >= TriggerClass::Low.threshold() {
            selection.triggers_low.push(index)?;
        }
        if track.pt >= TriggerClass::High.threshold() {
            selection.triggers_high.push(index)?;
        }
        let mut accepted = AcceptedTrack {
            index,
            pt: track.pt,
            p: track.p,
            eta: track.eta,
            phi,
            sign: track.sign(),
            tof: None,
            stage: None,
        };
        if let Some(sign) = accepted.sign {
            if pid.status(Detector::Tof, track).is_ok() {
                let observables = TofObservables::compute(track, pid);
                let stage = selector.classify(sign, track.p, track.tpc_signal, &observables);
                if stage.is_deuteron() {
                    selection.deuterons.push(index)?;
                }
                accepted.tof = Some(observables);
                accepted.stage = Some(stage);
            }
        }
        selection.accepted.push(accepted);
    }
    Ok(selection)
}

/// Perform every single-track fill for a selected event, finishing with exactly one fill of the
/// deuteron multiplicity.
pub fn fill_single_track<S: Sink + ?Sized>(selection: &EventSelection, sink: &mut S) {
    if let Some(centrality) = selection.centrality {
        sink.fill_2d(
            HistogramId::CentralityTracks,
            centrality,
            selection.n_tracks as f64,
        );
    }
    for track in &selection.accepted {
        sink.fill(HistogramId::TrackPt, track.pt);
        let (Some(sign), Some(obs), Some(stage)) = (track.sign, track.tof, track.stage) else {
            continue;
        };
        let in_phi_eta_range = PHI_ETA_PT_RANGE.contains(&track.pt);
        sink.fill_2d(
            HistogramId::MassSquaredPt {
                sign,
                stage: SelectionStage::Tof,
            },
            track.pt,
            obs.mass_squared,
        );
        sink.fill_2d(HistogramId::BetaP { sign, band_cut: false }, track.p, obs.beta);
        sink.fill_2d(
            HistogramId::DeltaTPt { sign, band_cut: false },
            track.pt,
            obs.delta_t,
        );
        if in_phi_eta_range {
            sink.fill_2d(
                HistogramId::PhiEta {
                    sign,
                    deuteron: false,
                },
                track.phi,
                track.eta,
            );
        }
        if !stage.passed_band_cut() {
            continue;
        }
        sink.fill_2d(
            HistogramId::MassSquaredPt {
                sign,
                stage: SelectionStage::BandCut,
            },
            track.pt,
            obs.mass_squared,
        );
        sink.fill_2d(HistogramId::BetaP { sign, band_cut: true }, track.p, obs.beta);
        sink.fill_2d(
            HistogramId::DeltaTPt { sign, band_cut: true },
            track.pt,
            obs.delta_t,
        );
        if !stage.is_deuteron() {
            continue;
        }
        sink.fill_2d(
            HistogramId::MassSquaredPt {
                sign,
                stage: SelectionStage::Deuteron,
            },
            track.pt,
            obs.mass_squared,
        );
        if in_phi_eta_range {
            sink.fill_2d(
                HistogramId::PhiEta {
                    sign,
                    deuteron: true,
                },
                track.phi,
                track.eta,
            );
        }
        sink.fill_2d(HistogramId::DeuteronPhiPt(None), track.pt, track.phi);
        sink.fill_2d(HistogramId::DeuteronPhiPt(Some(sign)), track.pt, track.phi);
    }
    sink.fill(
        HistogramId::DeuteronsPerEvent,
        selection.n_deuterons() as f64,
    );
}
