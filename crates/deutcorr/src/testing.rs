use deutcorr_core::{KinematicPidResponse, Track};
use deutcorr_pid::DeuteronSelector;

use crate::generator::TrackFactory;

fn factory() -> TrackFactory {
    TrackFactory::new(KinematicPidResponse::default(), DeuteronSelector::default())
}

/// A deuteron on the calibrated peak of the default selector.
pub(crate) fn deuteron_track(pt: f64, eta: f64, phi: f64, charge: i16) -> Track {
    factory().deuteron(pt, eta, phi, charge, 0.0)
}

/// A minimum-ionizing pion with a usable TOF signal.
pub(crate) fn pion_track(pt: f64, eta: f64, phi: f64, charge: i16) -> Track {
    factory().pion(pt, eta, phi, charge)
}
