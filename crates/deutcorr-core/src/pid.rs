use crate::{Detector, PidStatus, Species, Track, C_CM_PER_NS};

/// The interface to a detector particle-identification response.
///
/// The analysis needs three things from it for each track: whether the TPC and TOF measurements
/// are usable, the event start time at the track's momentum, and the expected TOF stop signal
/// under a given species hypothesis. Times are in ps.
pub trait PidResponse: Send + Sync {
    /// The usability of `detector`'s measurement for `track`.
    fn status(&self, detector: Detector, track: &Track) -> PidStatus;
    /// The collision start time (ps) used for a track with the given total momentum.
    fn start_time(&self, momentum: f64) -> f64;
    /// The expected TOF signal (ps) of `track` under the `species` hypothesis, measured from the
    /// start time.
    fn expected_signal(&self, track: &Track, species: Species) -> f64;
}

impl<P: PidResponse + ?Sized> PidResponse for &P {
    fn status(&self, detector: Detector, track: &Track) -> PidStatus {
        (**self).status(detector, track)
    }
    fn start_time(&self, momentum: f64) -> f64 {
        (**self).start_time(momentum)
    }
    fn expected_signal(&self, track: &Track, species: Species) -> f64 {
        (**self).expected_signal(track, species)
    }
}

/// A [`PidResponse`] computed from the track's own kinematics and integrated length.
///
/// The expected signal is the flight time $`L / (\beta c)`$ with
/// $`\beta = p / \sqrt{p^2 + m^2}`$ for the hypothesis mass $`m`$. The start time is a fixed
/// offset which does not depend on momentum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicPidResponse {
    /// Event start time (ps).
    pub start_time: f64,
}

impl KinematicPidResponse {
    /// A response with the given fixed start time (ps).
    pub fn new(start_time: f64) -> Self {
        Self { start_time }
    }

    /// Flight time (ps) over `length` cm at momentum `p` for a particle of mass `mass`.
    pub fn flight_time(length: f64, p: f64, mass: f64) -> f64 {
        let beta = p / p.hypot(mass);
        length / (beta * C_CM_PER_NS) * 1e3
    }
}

impl PidResponse for KinematicPidResponse {
    fn status(&self, detector: Detector, track: &Track) -> PidStatus {
        match detector {
            Detector::Tpc => {
                if track.tpc_signal.is_finite() && track.tpc_signal > 0.0 {
                    PidStatus::Ok
                } else {
                    PidStatus::NoSignal
                }
            }
            Detector::Tof => {
                if !(track.tof_signal > 0.0) {
                    PidStatus::NoSignal
                } else if !track.tof_signal.is_finite() || !(track.length > 0.0) {
                    PidStatus::BadSignal
                } else {
                    PidStatus::Ok
                }
            }
        }
    }

    fn start_time(&self, _momentum: f64) -> f64 {
        self.start_time
    }

    fn expected_signal(&self, track: &Track, species: Species) -> f64 {
        Self::flight_time(track.length, track.p, species.mass())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flight_time() {
        // an ultra-relativistic particle covers 29.9792458 cm per ns
        let t = KinematicPidResponse::flight_time(C_CM_PER_NS, 1e6, Species::Electron.mass());
        assert_relative_eq!(t, 1000.0, epsilon = 1e-6);
        let t_d = KinematicPidResponse::flight_time(370.0, 2.0, Species::Deuteron.mass());
        let t_pi = KinematicPidResponse::flight_time(370.0, 2.0, Species::Pion.mass());
        assert!(t_d > t_pi);
        let beta = 2.0 / (4.0 + Species::Deuteron.mass().powi(2)).sqrt();
        assert_relative_eq!(t_d, 370.0 / (beta * C_CM_PER_NS) * 1e3, epsilon = 1e-9);
    }

    #[test]
    fn test_expected_signal_uses_track_length() {
        let pid = KinematicPidResponse::new(25.0);
        let track = Track::from_kinematics(1.0, 0.0, 0.0, 1).with_signals(50.0, 13_000.0, 380.0);
        assert_relative_eq!(
            pid.expected_signal(&track, Species::Proton),
            KinematicPidResponse::flight_time(380.0, 1.0, Species::Proton.mass())
        );
        assert_eq!(pid.start_time(3.0), 25.0);
        assert_eq!((&pid).start_time(0.5), 25.0);
    }

    #[test]
    fn test_status() {
        let pid = KinematicPidResponse::default();
        let good = Track::from_kinematics(1.0, 0.0, 0.0, 1).with_signals(50.0, 13_000.0, 380.0);
        assert_eq!(pid.status(Detector::Tpc, &good), PidStatus::Ok);
        assert_eq!(pid.status(Detector::Tof, &good), PidStatus::Ok);

        let no_tof = good.with_signals(50.0, 0.0, 380.0);
        assert_eq!(pid.status(Detector::Tof, &no_tof), PidStatus::NoSignal);
        let nan_tof = good.with_signals(50.0, f64::NAN, 380.0);
        assert_eq!(pid.status(Detector::Tof, &nan_tof), PidStatus::NoSignal);
        let no_length = good.with_signals(50.0, 13_000.0, 0.0);
        assert_eq!(pid.status(Detector::Tof, &no_length), PidStatus::BadSignal);
        let inf_tof = good.with_signals(50.0, f64::INFINITY, 380.0);
        assert_eq!(pid.status(Detector::Tof, &inf_tof), PidStatus::BadSignal);

        let no_tpc = good.with_signals(0.0, 13_000.0, 380.0);
        assert_eq!(pid.status(Detector::Tpc, &no_tpc), PidStatus::NoSignal);
        assert!(!pid.status(Detector::Tpc, &no_tpc).is_ok());
    }
}
