use std::ops::Range;

use deutcorr_core::{DeutcorrError, DeutcorrResult, Sign};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CurveForm, CurveTable, TofObservables};

/// The momentum range (GeV/$`c`$) inside which the squared-mass window is applied. Tracks outside
/// it are never identified.
pub const MOMENTUM_WINDOW: Range<f64> = 1.0..4.4;

/// The empirical TPC dE/dx versus $`\Delta t`$ band selecting deuteron-like tracks.
///
/// A track passes if it lies above the lower line $`\text{d}E/\text{d}x > 7.91143\,\Delta t +
/// 28.8714`$, to the right of $`\Delta t > 0.07216\,\text{d}E/\text{d}x - 5.11340`$, and below the
/// upper boundary of the $`\Delta t`$ region it falls in.
pub fn passes_band_cut(dedx: f64, delta_t: f64) -> bool {
    if !(dedx > 7.91143 * delta_t + 28.8714 && delta_t > 0.07216 * dedx - 5.11340) {
        return false;
    }
    (1.0 <= delta_t && delta_t < 6.0 && dedx < 9.6774 * delta_t + 46.7742)
        || (0.5 <= delta_t && delta_t < 1.0 && dedx < 56.4516)
        || (delta_t < 0.5 && dedx < 56.4516)
        || (6.0 <= delta_t && dedx < 12.9032 * delta_t + 27.4193)
}

/// The open interval of dE/dx values accepted by [`passes_band_cut`] at a given $`\Delta t`$, or
/// [`None`] if the band is closed there.
pub fn band_cut_dedx_range(delta_t: f64) -> Option<(f64, f64)> {
    if delta_t.is_nan() {
        return None;
    }
    let lower = 7.91143 * delta_t + 28.8714;
    let upper_region = if delta_t >= 6.0 {
        12.9032 * delta_t + 27.4193
    } else if delta_t >= 1.0 {
        9.6774 * delta_t + 46.7742
    } else {
        56.4516
    };
    let upper = upper_region.min((delta_t + 5.11340) / 0.07216);
    (lower < upper).then_some((lower, upper))
}

/// How far a timing-valid track got through the deuteron selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SelectionStage {
    /// Timing is valid but the track fails the band cut.
    Tof,
    /// The track passes the band cut but is not identified (outside the momentum window or the
    /// squared-mass window).
    BandCut,
    /// The track is identified as a deuteron.
    Deuteron,
}

impl SelectionStage {
    /// Whether the track passed the band cut (including identified tracks).
    pub fn passed_band_cut(&self) -> bool {
        *self >= SelectionStage::BandCut
    }

    /// Whether the track is identified as a deuteron.
    pub fn is_deuteron(&self) -> bool {
        matches!(self, SelectionStage::Deuteron)
    }
}

/// The staged deuteron classifier.
///
/// Stage A is the band cut in dE/dx versus $`\Delta t`$. Stage B, applied only inside
/// [`MOMENTUM_WINDOW`], requires the squared mass to lie strictly within `cut_width` standard
/// deviations of the calibrated peak for the track's charge sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeuteronSelector {
    curves: CurveTable,
    form: CurveForm,
    cut_width: f64,
}

impl DeuteronSelector {
    /// Build a selector, validating the calibration table and the window width.
    pub fn new(curves: CurveTable, form: CurveForm, cut_width: f64) -> DeutcorrResult<Self> {
        curves.validate()?;
        if !(cut_width.is_finite() && cut_width > 0.0) {
            return Err(DeutcorrError::InvalidConfig {
                reason: format!("cut width must be finite and positive (got {cut_width})"),
            });
        }
        Ok(Self {
            curves,
            form,
            cut_width,
        })
    }

    /// The calibration table in use.
    pub fn curves(&self) -> &CurveTable {
        &self.curves
    }

    /// The curve form in use.
    pub fn form(&self) -> CurveForm {
        self.form
    }

    /// The half-width of the squared-mass window in units of the calibrated sigma.
    pub fn cut_width(&self) -> f64 {
        self.cut_width
    }

    /// The squared-mass window $`(\mu - w\sigma, \mu + w\sigma)`$ at momentum `p`, or [`None`]
    /// outside [`MOMENTUM_WINDOW`].
    pub fn mass_window(&self, sign: Sign, p: f64) -> Option<(f64, f64)> {
        if !MOMENTUM_WINDOW.contains(&p) {
            return None;
        }
        let mean = self.curves.mean(sign, self.form, p);
        let sigma = self.curves.sigma(sign, self.form, p);
        Some((mean - self.cut_width * sigma, mean + self.cut_width * sigma))
    }

    /// Whether `mass_squared` is inside the window at momentum `p`. Always `false` outside
    /// [`MOMENTUM_WINDOW`].
    pub fn in_mass_window(&self, sign: Sign, p: f64, mass_squared: f64) -> bool {
        self.mass_window(sign, p)
            .is_some_and(|(low, high)| mass_squared < high && mass_squared > low)
    }

    /// Classify a timing-valid track of the given sign, total momentum and dE/dx.
    pub fn classify(
        &self,
        sign: Sign,
        p: f64,
        dedx: f64,
        observables: &TofObservables,
    ) -> SelectionStage {
        if !passes_band_cut(dedx, observables.delta_t) {
            return SelectionStage::Tof;
        }
        if !MOMENTUM_WINDOW.contains(&p) {
            trace!("band-cut track at p = {p} is outside the momentum window");
            return SelectionStage::BandCut;
        }
        if self.in_mass_window(sign, p, observables.mass_squared) {
            SelectionStage::Deuteron
        } else {
            SelectionStage::BandCut
        }
    }
}

impl Default for DeuteronSelector {
    fn default() -> Self {
        Self {
            curves: CurveTable::default(),
            form: CurveForm::default(),
            cut_width: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn observables(delta_t: f64, mass_squared: f64) -> TofObservables {
        TofObservables {
            beta: 0.8,
            delta_t,
            mass_squared,
        }
    }

    #[test]
    fn test_band_cut_literals() {
        assert!(passes_band_cut(50.0, 0.6));
        assert!(!passes_band_cut(60.0, 0.6));
    }

    #[test]
    fn test_band_cut_regions() {
        // below the lower line
        assert!(!passes_band_cut(30.0, 0.6));
        // 1 <= dt < 6
        assert!(passes_band_cut(60.0, 3.0));
        assert!(!passes_band_cut(80.0, 3.0));
        // dt < 0.5
        assert!(passes_band_cut(40.0, 0.2));
        // dt >= 6
        assert!(passes_band_cut(100.0, 8.0));
        assert!(!passes_band_cut(140.0, 8.0));
        assert!(!passes_band_cut(f64::NAN, 1.0));
        assert!(!passes_band_cut(50.0, f64::NAN));
    }

    #[test]
    fn test_band_cut_dedx_range() {
        for delta_t in [-1.0, 0.2, 0.6, 1.0, 3.0, 5.9, 6.0, 8.0, 12.0] {
            if let Some((low, high)) = band_cut_dedx_range(delta_t) {
                let mid = 0.5 * (low + high);
                assert!(passes_band_cut(mid, delta_t), "dt = {delta_t}, dedx = {mid}");
                assert!(!passes_band_cut(low, delta_t));
                assert!(!passes_band_cut(high, delta_t));
            }
        }
        let (low, high) = band_cut_dedx_range(0.6).unwrap();
        assert_relative_eq!(low, 7.91143 * 0.6 + 28.8714);
        assert_relative_eq!(high, 56.4516);
        assert!(band_cut_dedx_range(f64::NAN).is_none());
    }

    #[test]
    fn test_selector_validation() {
        let curves = CurveTable::default();
        assert!(DeuteronSelector::new(curves, CurveForm::Quadratic, 3.0).is_ok());
        assert!(DeuteronSelector::new(curves, CurveForm::Quadratic, 0.0).is_err());
        assert!(DeuteronSelector::new(curves, CurveForm::Quadratic, f64::INFINITY).is_err());
        let mut bad = curves;
        bad.positive.mean.0[0] = f64::INFINITY;
        assert!(matches!(
            DeuteronSelector::new(bad, CurveForm::Quadratic, 3.0),
            Err(DeutcorrError::InvalidCalibration { .. })
        ));
    }

    #[test]
    fn test_mass_window_is_strict_and_signed() {
        let selector = DeuteronSelector::default();
        let (low, high) = selector.mass_window(Sign::Negative, 2.0).unwrap();
        let mean = selector.curves().mean(Sign::Negative, CurveForm::Quadratic, 2.0);
        let sigma = selector.curves().sigma(Sign::Negative, CurveForm::Quadratic, 2.0);
        assert_relative_eq!(low, mean - 3.0 * sigma);
        assert_relative_eq!(high, mean + 3.0 * sigma);
        assert!(selector.in_mass_window(Sign::Negative, 2.0, mean));
        assert!(!selector.in_mass_window(Sign::Negative, 2.0, low));
        assert!(!selector.in_mass_window(Sign::Negative, 2.0, high));
        assert!(!selector.in_mass_window(Sign::Positive, 2.0, mean));
    }

    #[test]
    fn test_momentum_window_gates_stage_b() {
        let selector = DeuteronSelector::default();
        for p in [0.2, 0.999, 4.4, 5.0, 10.0] {
            assert!(selector.mass_window(Sign::Positive, p).is_none());
            // m^2 at the would-be mean still does not identify the track
            let mean = selector.curves().mean(Sign::Positive, CurveForm::Quadratic, p);
            let stage = selector.classify(Sign::Positive, p, 50.0, &observables(0.6, mean));
            assert_eq!(stage, SelectionStage::BandCut);
        }
        assert!(selector.mass_window(Sign::Positive, 1.0).is_some());
        assert!(selector.mass_window(Sign::Positive, 4.399).is_some());
    }

    #[test]
    fn test_classify_stages() {
        let selector = DeuteronSelector::default();
        let p = 1.5;
        let mean = selector.curves().mean(Sign::Positive, CurveForm::Quadratic, p);
        assert_eq!(
            selector.classify(Sign::Positive, p, 60.0, &observables(0.6, mean)),
            SelectionStage::Tof
        );
        assert_eq!(
            selector.classify(Sign::Positive, p, 50.0, &observables(0.6, mean + 5.0)),
            SelectionStage::BandCut
        );
        let stage = selector.classify(Sign::Positive, p, 50.0, &observables(0.6, mean));
        assert_eq!(stage, SelectionStage::Deuteron);
        assert!(stage.passed_band_cut() && stage.is_deuteron());
        assert!(!SelectionStage::Tof.passed_band_cut());
        assert!(SelectionStage::BandCut.passed_band_cut());
    }
}
