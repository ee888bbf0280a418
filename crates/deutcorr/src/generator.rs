use std::f64::consts::TAU;

use deutcorr_core::{
    DeutcorrResult, Event, KinematicPidResponse, PidResponse, Sign, Species, Track,
};
use deutcorr_pid::{selection::band_cut_dedx_range, DeuteronSelector};
use fastrand_contrib::RngExt;

use crate::config::AnalysisConfig;

/// Nominal integrated length (cm) from the vertex to the TOF.
pub const TOF_LENGTH: f64 = 370.0;

/// Typical TPC signal of a minimum-ionizing track.
pub const MIP_DEDX: f64 = 50.0;

/// Builds tracks whose detector signals are consistent with a [`KinematicPidResponse`].
///
/// Deuterons are placed relative to the calibrated squared-mass peak of the selector, so a
/// deuteron built with a pull of zero is identified whenever its momentum is inside the
/// calibrated window.
#[derive(Debug, Clone)]
pub struct TrackFactory {
    pid: KinematicPidResponse,
    selector: DeuteronSelector,
    length: f64,
}

impl TrackFactory {
    /// A factory producing tracks for `pid` and `selector`.
    pub fn new(pid: KinematicPidResponse, selector: DeuteronSelector) -> Self {
        Self {
            pid,
            selector,
            length: TOF_LENGTH,
        }
    }

    /// The PID response the signals are consistent with.
    pub fn pid(&self) -> &KinematicPidResponse {
        &self.pid
    }

    fn timed(&self, track: Track, tof: f64, dedx: f64) -> Track {
        track.with_signals(dedx, self.pid.start_time(track.p) + tof, self.length)
    }

    /// A track arriving at the TOF exactly on time for `species`.
    pub fn species(
        &self,
        species: Species,
        pt: f64,
        eta: f64,
        phi: f64,
        charge: i16,
        dedx: f64,
    ) -> Track {
        let track =
            Track::from_kinematics(pt, eta, phi, charge).with_signals(0.0, 0.0, self.length);
        let tof = self.pid.expected_signal(&track, species);
        self.timed(track, tof, dedx)
    }

    /// A minimum-ionizing pion.
    pub fn pion(&self, pt: f64, eta: f64, phi: f64, charge: i16) -> Track {
        self.species(Species::Pion, pt, eta, phi, charge, MIP_DEDX)
    }

    /// A deuteron whose reconstructed squared mass sits `pull` calibrated sigmas away from the peak
    /// and whose dE/dx is in the middle of the band cut.
    ///
    /// Outside the calibrated momentum window the peak at the nearest window edge is used.
    pub fn deuteron(&self, pt: f64, eta: f64, phi: f64, charge: i16, pull: f64) -> Track {
        let track =
            Track::from_kinematics(pt, eta, phi, charge).with_signals(0.0, 0.0, self.length);
        let sign = track.sign().unwrap_or(Sign::Positive);
        let p_curve = track.p.clamp(1.0, 4.39);
        let curves = self.selector.curves();
        let form = self.selector.form();
        let mass_squared = curves.mean(sign, form, p_curve)
            + pull * curves.sigma(sign, form, p_curve).abs();
        let t_pion = self.pid.expected_signal(&track, Species::Pion);
        let tof = t_pion * (1.0 + mass_squared / track.p.powi(2)).sqrt();
        let delta_t = (tof - t_pion) * 1e-3;
        let dedx = band_cut_dedx_range(delta_t)
            .map_or(7.91143 * delta_t + 38.8714, |(low, high)| 0.5 * (low + high));
        self.timed(track, tof, dedx)
    }
}

/// A seeded source of synthetic events.
///
/// Each event holds pions and protons with a steeply falling $`p_T`$ spectrum, a small admixture
/// of deuterons, occasionally a high-$`p_T`$ trigger particle, and a few unreconstructed slots.
#[derive(Debug, Clone)]
pub struct EventGenerator {
    rng: fastrand::Rng,
    factory: TrackFactory,
    /// Range of the number of track slots per event. An empty range gives events without
    /// tracks.
    pub multiplicity: std::ops::Range<usize>,
    /// Probability that a slot holds a deuteron.
    pub deuteron_fraction: f64,
    /// Probability that an event contains a trigger particle.
    pub trigger_probability: f64,
}

impl EventGenerator {
    /// A generator seeded with `seed`, producing signals consistent with `config` and the default
    /// [`KinematicPidResponse`].
    pub fn new(seed: u64, config: &AnalysisConfig) -> DeutcorrResult<Self> {
        Ok(Self {
            rng: fastrand::Rng::with_seed(seed),
            factory: TrackFactory::new(KinematicPidResponse::default(), config.selector()?),
            multiplicity: 5..40,
            deuteron_fraction: 0.05,
            trigger_probability: 0.4,
        })
    }

    /// The track factory in use.
    pub fn factory(&self) -> &TrackFactory {
        &self.factory
    }

    fn charge(&mut self) -> i16 {
        if self.rng.bool() {
            1
        } else {
            -1
        }
    }

    fn track(&mut self) -> Option<Track> {
        if self.rng.f64() < 0.01 {
            return None;
        }
        let eta = self.rng.f64_range(-0.9..0.9);
        let phi = self.rng.f64_range(0.0..TAU);
        let charge = self.charge();
        let roll = self.rng.f64();
        let track = if roll < self.deuteron_fraction {
            let pt = self.rng.f64_range(1.0..2.2);
            let pull = self.rng.f64_normal(0.0, 1.0);
            self.factory.deuteron(pt, eta, phi, charge, pull)
        } else if roll < self.deuteron_fraction + 0.15 {
            let pt = 0.2 - 0.7 * (1.0 - self.rng.f64()).ln();
            let dedx = MIP_DEDX * (1.0 + 0.3 / pt) + self.rng.f64_normal(0.0, 3.0);
            self.factory.species(Species::Proton, pt, eta, phi, charge, dedx)
        } else {
            let pt = 0.15 - 0.5 * (1.0 - self.rng.f64()).ln();
            let mut track = self.factory.pion(pt, eta, phi, charge);
            track.tpc_signal += self.rng.f64_normal(0.0, 3.0);
            if self.rng.f64() < 0.2 {
                // no TOF match
                track.tof_signal = 0.0;
            }
            track
        };
        Some(track)
    }

    /// Generate the next event.
    pub fn generate(&mut self) -> Event {
        let n = if self.multiplicity.is_empty() {
            0
        } else {
            self.rng.usize(self.multiplicity.clone())
        };
        let mut tracks: Vec<Option<Track>> = (0..n).map(|_| self.track()).collect();
        if self.rng.f64() < self.trigger_probability {
            let pt = self.rng.f64_range(5.0..15.0);
            let eta = self.rng.f64_range(-0.8..0.8);
            let phi = self.rng.f64_range(0.0..TAU);
            let charge = self.charge();
            tracks.push(Some(self.factory.pion(pt, eta, phi, charge)));
        }
        Event {
            tracks,
            centrality: Some(self.rng.f64_range(0.0..100.0)),
        }
    }

    /// Generate `n` events.
    pub fn generate_n(&mut self, n: usize) -> Vec<Event> {
        (0..n).map(|_| self.generate()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use deutcorr_pid::{SelectionStage, TofObservables};

    #[test]
    fn test_pion_is_on_time() {
        let factory =
            TrackFactory::new(KinematicPidResponse::new(150.0), DeuteronSelector::default());
        let pion = factory.pion(1.0, 0.2, 0.0, 1);
        let obs = TofObservables::compute(&pion, factory.pid());
        assert_relative_eq!(obs.delta_t, 0.0, epsilon = 1e-9);
        assert_relative_eq!(obs.mass_squared, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_deuteron_lands_on_peak() {
        let selector = DeuteronSelector::default();
        let factory = TrackFactory::new(KinematicPidResponse::default(), selector);
        for (pt, charge) in [(1.2, 1), (1.5, -1), (2.0, -1)] {
            let track = factory.deuteron(pt, 0.0, 0.0, charge, 0.0);
            let obs = TofObservables::compute(&track, factory.pid());
            let sign = track.sign().unwrap();
            let mean = selector.curves().mean(sign, selector.form(), track.p);
            assert_relative_eq!(obs.mass_squared, mean, epsilon = 1e-9);
            let stage = selector.classify(sign, track.p, track.tpc_signal, &obs);
            assert_eq!(stage, SelectionStage::Deuteron);
        }
    }

    #[test]
    fn test_deuteron_far_off_peak_fails_window() {
        let selector = DeuteronSelector::default();
        let factory = TrackFactory::new(KinematicPidResponse::default(), selector);
        let track = factory.deuteron(1.5, 0.0, 0.0, -1, 5.0);
        let obs = TofObservables::compute(&track, factory.pid());
        let stage = selector.classify(Sign::Negative, track.p, track.tpc_signal, &obs);
        assert_eq!(stage, SelectionStage::BandCut);
    }

    #[test]
    fn test_generator_is_reproducible() {
        let config = AnalysisConfig::default();
        let mut a = EventGenerator::new(7, &config).unwrap();
        let mut b = EventGenerator::new(7, &config).unwrap();
        let events_a = a.generate_n(20);
        assert_eq!(events_a, b.generate_n(20));
        for event in &events_a {
            assert!(event.n_tracks() >= 5);
            assert!(event.centrality.is_some());
        }
        let mut c = EventGenerator::new(8, &config).unwrap();
        assert_ne!(events_a, c.generate_n(20));
    }

    #[test]
    fn test_empty_multiplicity_range() {
        let mut generator = EventGenerator::new(3, &AnalysisConfig::default()).unwrap();
        generator.multiplicity = 5..5;
        generator.trigger_probability = 0.0;
        for event in generator.generate_n(10) {
            assert_eq!(event.n_tracks(), 0);
        }
        generator.multiplicity = 4..2;
        generator.trigger_probability = 1.0;
        for event in generator.generate_n(10) {
            assert_eq!(event.n_tracks(), 1);
            assert!(event.track(0).unwrap().pt >= 5.0);
        }
    }

    #[test]
    fn test_deuteron_pulls_are_centered() {
        let config = AnalysisConfig::default();
        let mut generator = EventGenerator::new(21, &config).unwrap();
        generator.deuteron_fraction = 1.0;
        generator.trigger_probability = 0.0;
        let selector = config.selector().unwrap();
        let factory = generator.factory().clone();
        let mut pulls = Vec::new();
        for event in generator.generate_n(200) {
            for (_, track) in event.iter() {
                let sign = track.sign().unwrap();
                let obs = TofObservables::compute(track, factory.pid());
                let mean = selector.curves().mean(sign, selector.form(), track.p);
                let sigma = selector.curves().sigma(sign, selector.form(), track.p).abs();
                pulls.push((obs.mass_squared - mean) / sigma);
            }
        }
        let n = pulls.len() as f64;
        let mean = pulls.iter().sum::<f64>() / n;
        let variance = pulls.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(n > 1000.0);
        assert!(mean.abs() < 0.1, "mean pull {mean}");
        assert!((variance.sqrt() - 1.0).abs() < 0.1, "pull width {}", variance.sqrt());
    }
}
