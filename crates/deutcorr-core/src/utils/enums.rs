use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::DeutcorrError;

/// A simple enum describing a binary sign.
///
/// Tracks are routed into charge branches by [`Sign::from_charge`], which has no branch for a
/// neutral (or undetermined) charge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sign {
    /// A positive indicator.
    Positive,
    /// A negative indicator.
    Negative,
}

impl Sign {
    /// The sign of an electric charge, or [`None`] for a neutral charge.
    pub fn from_charge(charge: i16) -> Option<Self> {
        match charge {
            c if c > 0 => Some(Self::Positive),
            c if c < 0 => Some(Self::Negative),
            _ => None,
        }
    }

    /// The short suffix used in histogram names (`pos`/`neg`).
    pub fn suffix(&self) -> &'static str {
        match self {
            Sign::Positive => "pos",
            Sign::Negative => "neg",
        }
    }
}

impl Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sign::Positive => write!(f, "+"),
            Sign::Negative => write!(f, "-"),
        }
    }
}

impl FromStr for Sign {
    type Err = DeutcorrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "+" | "plus" | "pos" | "positive" => Ok(Self::Positive),
            "-" | "minus" | "neg" | "negative" => Ok(Self::Negative),
            _ => Err(DeutcorrError::ParseError {
                name: s.to_string(),
                object: "Sign".to_string(),
            }),
        }
    }
}

/// Particle-species hypotheses for which a PID response can provide expected signals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    /// $`e^\pm`$
    Electron,
    /// $`\mu^\pm`$
    Muon,
    /// $`\pi^\pm`$
    Pion,
    /// $`K^\pm`$
    Kaon,
    /// $`p`$, $`\bar{p}`$
    Proton,
    /// $`d`$, $`\bar{d}`$
    Deuteron,
    /// $`t`$, $`\bar{t}`$
    Triton,
    /// $`^3\text{He}`$
    Helium3,
    /// $`^4\text{He}`$
    Alpha,
}

impl Species {
    /// Rest mass in GeV/$`c^2`$.
    pub fn mass(&self) -> f64 {
        match self {
            Species::Electron => 0.000510998950,
            Species::Muon => 0.1056583755,
            Species::Pion => 0.13957039,
            Species::Kaon => 0.493677,
            Species::Proton => 0.93827208816,
            Species::Deuteron => 1.87561294257,
            Species::Triton => 2.80892113298,
            Species::Helium3 => 2.80839160743,
            Species::Alpha => 3.7273794066,
        }
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Species::Electron => "electron",
            Species::Muon => "muon",
            Species::Pion => "pion",
            Species::Kaon => "kaon",
            Species::Proton => "proton",
            Species::Deuteron => "deuteron",
            Species::Triton => "triton",
            Species::Helium3 => "helium3",
            Species::Alpha => "alpha",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Species {
    type Err = DeutcorrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "e" | "electron" => Ok(Self::Electron),
            "mu" | "muon" => Ok(Self::Muon),
            "pi" | "pion" => Ok(Self::Pion),
            "k" | "kaon" => Ok(Self::Kaon),
            "p" | "proton" => Ok(Self::Proton),
            "d" | "deuteron" => Ok(Self::Deuteron),
            "t" | "triton" => Ok(Self::Triton),
            "he3" | "helium3" => Ok(Self::Helium3),
            "alpha" | "he4" => Ok(Self::Alpha),
            _ => Err(DeutcorrError::ParseError {
                name: s.to_string(),
                object: "Species".to_string(),
            }),
        }
    }
}

/// Detectors which provide a particle-identification status.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Detector {
    /// The time-projection chamber (specific ionization, dE/dx).
    Tpc,
    /// The time-of-flight detector.
    Tof,
}

impl Display for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detector::Tpc => write!(f, "TPC"),
            Detector::Tof => write!(f, "TOF"),
        }
    }
}

/// Whether a detector's PID information is usable for a given track.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PidStatus {
    /// The measurement is usable.
    Ok,
    /// The track has no signal in the detector.
    NoSignal,
    /// The signal exists but is flagged as unusable.
    BadSignal,
}

impl PidStatus {
    /// Returns `true` only for [`PidStatus::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, PidStatus::Ok)
    }
}

/// The two high-$`p_T`$ trigger classes used as reference directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggerClass {
    /// Tracks with $`p_T \geq 5`$ GeV/$`c`$.
    Low,
    /// Tracks with $`p_T \geq 8`$ GeV/$`c`$.
    High,
}

impl TriggerClass {
    /// Both classes, lowest threshold first.
    pub const ALL: [TriggerClass; 2] = [TriggerClass::Low, TriggerClass::High];

    /// Minimum transverse momentum (inclusive) for a track to act as a trigger of this class.
    pub fn threshold(&self) -> f64 {
        match self {
            TriggerClass::Low => 5.0,
            TriggerClass::High => 8.0,
        }
    }

    /// Two-digit label used in histogram names.
    pub fn label(&self) -> &'static str {
        match self {
            TriggerClass::Low => "05",
            TriggerClass::High => "08",
        }
    }
}

impl Display for TriggerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pT >= {:.1}", self.threshold())
    }
}

/// The per-event candidate lists built by the selection pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateCategory {
    /// Tracks identified as deuterons.
    Deuteron,
    /// Tracks above a trigger threshold.
    Trigger(TriggerClass),
}

impl Display for CandidateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateCategory::Deuteron => write!(f, "deuteron"),
            CandidateCategory::Trigger(class) => write!(f, "trigger ({class})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn enum_displays() {
        assert_eq!(format!("{}", Sign::Positive), "+");
        assert_eq!(format!("{}", Sign::Negative), "-");
        assert_eq!(format!("{}", Species::Deuteron), "deuteron");
        assert_eq!(format!("{}", Detector::Tof), "TOF");
        assert_eq!(format!("{}", TriggerClass::High), "pT >= 8.0");
        assert_eq!(
            format!("{}", CandidateCategory::Trigger(TriggerClass::Low)),
            "trigger (pT >= 5.0)"
        );
    }

    #[test]
    fn enum_from_str() {
        assert_eq!(Sign::from_str("+").unwrap(), Sign::Positive);
        assert_eq!(Sign::from_str("pos").unwrap(), Sign::Positive);
        assert_eq!(Sign::from_str("Negative").unwrap(), Sign::Negative);
        assert!(Sign::from_str("zero").is_err());
        assert_eq!(Species::from_str("d").unwrap(), Species::Deuteron);
        assert_eq!(Species::from_str("Pion").unwrap(), Species::Pion);
        assert!(Species::from_str("graviton").is_err());
    }

    #[test]
    fn sign_from_charge() {
        assert_eq!(Sign::from_charge(1), Some(Sign::Positive));
        assert_eq!(Sign::from_charge(2), Some(Sign::Positive));
        assert_eq!(Sign::from_charge(-1), Some(Sign::Negative));
        assert_eq!(Sign::from_charge(0), None);
    }

    #[test]
    fn trigger_thresholds_are_ordered() {
        assert!(TriggerClass::Low.threshold() < TriggerClass::High.threshold());
        assert_eq!(TriggerClass::Low.label(), "05");
        assert_eq!(TriggerClass::High.label(), "08");
    }
}
