use deutcorr_core::{PidResponse, Species, Track, C_CM_PER_NS, C_M_PER_NS};
use serde::{Deserialize, Serialize};

/// Time of flight (ps) of `track` measured from the event start time.
pub fn time_of_flight<P: PidResponse + ?Sized>(track: &Track, pid: &P) -> f64 {
    track.tof_signal - pid.start_time(track.p)
}

/// The velocity fraction $`\beta`$ of a track, taken as the ratio of the expected electron flight
/// time to the measured one.
///
/// Both times are given in ps. A zero `time_of_flight` yields an infinite (or NaN) result which
/// is passed on unchanged.
pub fn beta(time_of_flight: f64, expected_electron: f64) -> f64 {
    let distance = expected_electron * 1e-3 * C_M_PER_NS;
    distance / (time_of_flight * 1e-3 * C_M_PER_NS)
}

/// The difference (ns) between the measured flight time and the one expected for a pion.
pub fn delta_t(time_of_flight: f64, expected_pion: f64) -> f64 {
    time_of_flight * 1e-3 - expected_pion * 1e-3
}

/// The squared mass (GeV²/$`c^4`$) reconstructed from momentum and flight time.
///
/// The flight length is not read from the track; it is reconstructed as the distance light travels
/// in the expected pion flight time, $`L = t_\pi c`$, so that
/// ```math
/// m^2 = p^2 \left(\frac{t^2 c^2}{L^2} - 1\right)
/// ```
pub fn mass_squared(momentum: f64, time_of_flight: f64, expected_pion: f64) -> f64 {
    let length = expected_pion * 1e-3 * C_M_PER_NS * 100.0;
    let t = time_of_flight * 1e-3;
    momentum.powi(2) * (t.powi(2) * C_CM_PER_NS.powi(2) / length.powi(2) - 1.0)
}

/// The observables derived from one track's TOF measurement.
///
/// They are computed fresh for every track and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TofObservables {
    /// Velocity fraction $`\beta = v/c`$.
    pub beta: f64,
    /// Measured minus expected-pion flight time (ns).
    pub delta_t: f64,
    /// Reconstructed squared mass (GeV²/$`c^4`$).
    pub mass_squared: f64,
}

impl TofObservables {
    /// Compute all observables for `track` using `pid` for the start time and expected signals.
    ///
    /// This should only be called for tracks whose TOF status is usable. No denominator is
    /// guarded; degenerate inputs give infinite or NaN observables.
    pub fn compute<P: PidResponse + ?Sized>(track: &Track, pid: &P) -> Self {
        let tof = time_of_flight(track, pid);
        let expected_pion = pid.expected_signal(track, Species::Pion);
        Self {
            beta: beta(tof, pid.expected_signal(track, Species::Electron)),
            delta_t: delta_t(tof, expected_pion),
            mass_squared: mass_squared(track.p, tof, expected_pion),
        }
    }

    /// Whether every observable is finite.
    pub fn is_finite(&self) -> bool {
        self.beta.is_finite() && self.delta_t.is_finite() && self.mass_squared.is_finite()
    }
}
