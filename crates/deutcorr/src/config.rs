use std::{fs, path::Path};

use deutcorr_core::{DeutcorrError, DeutcorrResult};
use deutcorr_pid::{CurveForm, CurveTable, DeuteronSelector};
use serde::{Deserialize, Serialize};

/// Settings of a correlation analysis, fixed before the first event is processed.
///
/// Every field has a default, so a JSON file only needs to list the values it changes:
/// ```json
/// { "cut_width": 2.5, "curve_form": "InverseSqrt" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Half-width of the squared-mass window in units of the calibrated sigma.
    pub cut_width: f64,
    /// Mean and sigma curves per charge sign.
    pub curves: CurveTable,
    /// How the curve coefficients are evaluated.
    pub curve_form: CurveForm,
    /// Maximum number of candidates per category per event. `None` lets the lists grow.
    pub max_candidates: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cut_width: 3.0,
            curves: CurveTable::default(),
            curve_form: CurveForm::default(),
            max_candidates: None,
        }
    }
}

impl AnalysisConfig {
    /// Check that the configuration can be used to process events.
    pub fn validate(&self) -> DeutcorrResult<()> {
        self.curves.validate()?;
        if !(self.cut_width.is_finite() && self.cut_width > 0.0) {
            return Err(DeutcorrError::InvalidConfig {
                reason: format!(
                    "cut_width must be finite and positive (got {})",
                    self.cut_width
                ),
            });
        }
        if self.max_candidates == Some(0) {
            return Err(DeutcorrError::InvalidConfig {
                reason: "max_candidates must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Build the classifier described by this configuration.
    pub fn selector(&self) -> DeutcorrResult<DeuteronSelector> {
        DeuteronSelector::new(self.curves, self.curve_form, self.cut_width)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(json: &str) -> DeutcorrResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON configuration file.
    pub fn from_json_file<T: AsRef<Path>>(path: T) -> DeutcorrResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> DeutcorrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
