use std::fmt::Display;

use deutcorr_core::{DeutcorrError, DeutcorrResult, Sign};
use serde::{Deserialize, Serialize};

/// The functional form used to evaluate a [`CalibrationCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveForm {
    /// $`a + b p + c p^2`$
    #[default]
    Quadratic,
    /// $`a + b p + c / \sqrt{p}`$
    InverseSqrt,
}

impl Display for CurveForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurveForm::Quadratic => write!(f, "a + b*p + c*p^2"),
            CurveForm::InverseSqrt => write!(f, "a + b*p + c/sqrt(p)"),
        }
    }
}

/// Three coefficients $`(a, b, c)`$ of a momentum-dependent calibration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve(pub [f64; 3]);

impl CalibrationCurve {
    /// Create a curve from its coefficients.
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self([a, b, c])
    }

    /// Evaluate the curve at momentum `p` (GeV/$`c`$).
    #[inline]
    pub fn evaluate(&self, form: CurveForm, p: f64) -> f64 {
        let [a, b, c] = self.0;
        match form {
            CurveForm::Quadratic => a + b * p + c * p * p,
            CurveForm::InverseSqrt => a + b * p + c / p.sqrt(),
        }
    }

    fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }
}

/// The mean and width curves of the squared-mass peak for one charge sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePair {
    /// Peak position.
    pub mean: CalibrationCurve,
    /// Peak width.
    pub sigma: CalibrationCurve,
}

/// The full calibration table: one [`CurvePair`] per charge sign.
///
/// The default holds the deuteron curves obtained from pp collisions at
/// $`\sqrt{s} = 13`$ TeV (2016, minimum bias).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveTable {
    /// Curves for positive tracks.
    pub positive: CurvePair,
    /// Curves for negative tracks.
    pub negative: CurvePair,
}

impl Default for CurveTable {
    fn default() -> Self {
        Self {
            positive: CurvePair {
                mean: CalibrationCurve::new(2.88465, 0.0761582, 0.709281),
                sigma: CalibrationCurve::new(0.124386, 0.017642, -0.0316078),
            },
            negative: CurvePair {
                mean: CalibrationCurve::new(2.65738, 0.115151, 0.918566),
                sigma: CalibrationCurve::new(0.0986592, 0.0187545, 0.00346519),
            },
        }
    }
}

impl CurveTable {
    /// The curves used for tracks of the given sign.
    pub fn pair(&self, sign: Sign) -> &CurvePair {
        match sign {
            Sign::Positive => &self.positive,
            Sign::Negative => &self.negative,
        }
    }

    /// Expected squared mass at momentum `p`.
    pub fn mean(&self, sign: Sign, form: CurveForm, p: f64) -> f64 {
        self.pair(sign).mean.evaluate(form, p)
    }

    /// Expected squared-mass width at momentum `p`.
    pub fn sigma(&self, sign: Sign, form: CurveForm, p: f64) -> f64 {
        self.pair(sign).sigma.evaluate(form, p)
    }

    /// Check that every coefficient is finite.
    pub fn validate(&self) -> DeutcorrResult<()> {
        for sign in [Sign::Positive, Sign::Negative] {
            let pair = self.pair(sign);
            for (name, curve) in [("mean", &pair.mean), ("sigma", &pair.sigma)] {
                if !curve.is_finite() {
                    return Err(DeutcorrError::InvalidCalibration {
                        reason: format!(
                            "{} {} curve has non-finite coefficients {:?}",
                            sign.suffix(),
                            name,
                            curve.0
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}
