use std::fmt::Display;

use auto_ops::impl_op_ex;
use deutcorr_core::{Binning, Histogram1D, Histogram2D, Sign, TriggerClass};
use deutcorr_pid::SelectionStage;
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Lower edge of the first transverse-momentum bin (GeV/$`c`$).
pub const PT_START: f64 = 0.10;
/// Ratio between the widths of neighbouring transverse-momentum bins.
pub const PT_RATIO: f64 = 1.005;
/// Number of transverse-momentum bins for single-track and associate spectra.
pub const PT_BINS: usize = 800;
/// Number of transverse-momentum bins for trigger spectra.
pub const TRIGGER_PT_BINS: usize = 1200;
/// Azimuthal axis limits, slightly wider than the folded range.
pub const PHI_LIMITS: (f64, f64) = (-1.6708, 4.8124);

/// The charge combination of a trigger and an associated deuteron.
///
/// Opposite-sign pairs are accumulated together regardless of which of the two is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PairCharge {
    /// Positive trigger, positive deuteron.
    PosPos,
    /// Opposite charges, in either order.
    PosNeg,
    /// Negative trigger, negative deuteron.
    NegNeg,
}

impl PairCharge {
    /// All combinations.
    pub const ALL: [PairCharge; 3] = [PairCharge::PosPos, PairCharge::PosNeg, PairCharge::NegNeg];

    /// The combination for a trigger of sign `trigger` and a deuteron of sign `associate`.
    pub fn from_signs(trigger: Sign, associate: Sign) -> Self {
        match (trigger, associate) {
            (Sign::Positive, Sign::Positive) => PairCharge::PosPos,
            (Sign::Negative, Sign::Negative) => PairCharge::NegNeg,
            _ => PairCharge::PosNeg,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PairCharge::PosPos => "pos_pos",
            PairCharge::PosNeg => "pos_neg",
            PairCharge::NegNeg => "neg_neg",
        }
    }
}

/// Identifies one accumulator of the analysis output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistogramId {
    /// Transverse momentum of every accepted track.
    TrackPt,
    /// Centrality percentile versus number of track slots in the event.
    CentralityTracks,
    /// Squared mass versus $`p_T`$ for timing-valid tracks which reached `stage`.
    MassSquaredPt {
        /// Charge sign of the track.
        sign: Sign,
        /// Minimum selection stage reached.
        stage: SelectionStage,
    },
    /// $`\beta`$ versus total momentum.
    BetaP {
        /// Charge sign of the track.
        sign: Sign,
        /// Only tracks passing the band cut.
        band_cut: bool,
    },
    /// Pion time residual versus $`p_T`$.
    DeltaTPt {
        /// Charge sign of the track.
        sign: Sign,
        /// Only tracks passing the band cut.
        band_cut: bool,
    },
    /// $`\eta`$ versus $`\phi`$ for timing-valid tracks with $`2 \le p_T < 5`$ GeV/$`c`$.
    PhiEta {
        /// Charge sign of the track.
        sign: Sign,
        /// Only identified deuterons.
        deuteron: bool,
    },
    /// Number of identified deuterons in each event.
    DeuteronsPerEvent,
    /// Azimuth versus $`p_T`$ of identified deuterons; `None` is charge inclusive.
    DeuteronPhiPt(Option<Sign>),
    /// Azimuth versus $`p_T`$ of triggers in events with at least one deuteron.
    TriggerPhiPt {
        /// Trigger threshold.
        class: TriggerClass,
        /// Charge sign of the trigger, or `None` for charge inclusive.
        sign: Option<Sign>,
    },
    /// Folded $`\Delta\phi`$ versus deuteron $`p_T`$ for trigger-deuteron pairs.
    Correlation {
        /// Trigger threshold.
        class: TriggerClass,
        /// Charge combination of the pair.
        pair: PairCharge,
    },
}

/// The axis layout of an accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum HistogramShape {
    /// One axis.
    OneD(Binning),
    /// Two axes.
    TwoD(Binning, Binning),
}

fn pt_axis() -> Binning {
    Binning::geometric(PT_BINS, PT_START, PT_RATIO)
}

fn phi_axis() -> Binning {
    Binning::uniform(300, PHI_LIMITS)
}

impl HistogramId {
    /// Every accumulator the analysis fills, in a fixed order.
    pub fn all() -> Vec<HistogramId> {
        let signs = [Sign::Positive, Sign::Negative];
        let mut ids = vec![HistogramId::TrackPt, HistogramId::CentralityTracks];
        for stage in [SelectionStage::Tof, SelectionStage::BandCut] {
            let band_cut = stage.passed_band_cut();
            for sign in signs {
                ids.push(HistogramId::MassSquaredPt { sign, stage });
                ids.push(HistogramId::BetaP { sign, band_cut });
                ids.push(HistogramId::DeltaTPt { sign, band_cut });
            }
        }
        ids.push(HistogramId::DeuteronsPerEvent);
        for sign in signs {
            ids.push(HistogramId::MassSquaredPt {
                sign,
                stage: SelectionStage::Deuteron,
            });
        }
        ids.push(HistogramId::DeuteronPhiPt(None));
        ids.extend(signs.map(|s| HistogramId::DeuteronPhiPt(Some(s))));
        for class in TriggerClass::ALL {
            for sign in [None, Some(Sign::Positive), Some(Sign::Negative)] {
                ids.push(HistogramId::TriggerPhiPt { class, sign });
            }
        }
        for class in TriggerClass::ALL {
            for pair in PairCharge::ALL {
                ids.push(HistogramId::Correlation { class, pair });
            }
        }
        for deuteron in [false, true] {
            for sign in signs {
                ids.push(HistogramId::PhiEta { sign, deuteron });
            }
        }
        ids
    }

    /// The conventional name of the accumulator.
    pub fn name(&self) -> String {
        match self {
            HistogramId::TrackPt => "fHistPt".to_string(),
            HistogramId::CentralityTracks => "cent_ntracks".to_string(),
            HistogramId::MassSquaredPt { sign, stage } => {
                let suffix = match stage {
                    SelectionStage::Tof => "",
                    SelectionStage::BandCut => "_cut",
                    SelectionStage::Deuteron => "_cut_T",
                };
                format!("m2_pt_{}{}", sign.suffix(), suffix)
            }
            HistogramId::BetaP { sign, band_cut } => {
                format!("beta_p_{}{}", sign.suffix(), if *band_cut { "_cut" } else { "" })
            }
            HistogramId::DeltaTPt { sign, band_cut } => {
                format!(
                    "deltat_pt_{}{}",
                    sign.suffix(),
                    if *band_cut { "_cut" } else { "" }
                )
            }
            HistogramId::PhiEta { sign, deuteron } => format!(
                "tof_phi_eta_{}{}",
                sign.suffix(),
                if *deuteron { "_deut" } else { "" }
            ),
            HistogramId::DeuteronsPerEvent => "deut_per_event".to_string(),
            HistogramId::DeuteronPhiPt(None) => "deut_phi_pt".to_string(),
            HistogramId::DeuteronPhiPt(Some(sign)) => format!("deut_phi_pt_{}", sign.suffix()),
            HistogramId::TriggerPhiPt { class, sign } => match sign {
                None => format!("trig_{}_phi_pt", class.label()),
                Some(sign) => format!("trig_{}_phi_pt_{}", class.label(), sign.suffix()),
            },
            HistogramId::Correlation { class, pair } => {
                format!("deut_dphi_pt_{}_{}", pair.label(), class.label())
            }
        }
    }

    /// The default axes of the accumulator.
    pub fn shape(&self) -> HistogramShape {
        match self {
            HistogramId::TrackPt => HistogramShape::OneD(pt_axis()),
            HistogramId::DeuteronsPerEvent => {
                HistogramShape::OneD(Binning::uniform(12, (0.0, 12.0)))
            }
            HistogramId::CentralityTracks => HistogramShape::TwoD(
                Binning::uniform(100, (0.0, 100.0)),
                Binning::uniform(100, (0.0, 800.0)),
            ),
            HistogramId::MassSquaredPt { .. } => {
                HistogramShape::TwoD(pt_axis(), Binning::uniform(2400, (-1.0, 7.0)))
            }
            HistogramId::BetaP { .. } => {
                HistogramShape::TwoD(pt_axis(), Binning::uniform(3000, (0.1, 1.1)))
            }
            HistogramId::DeltaTPt { .. } => {
                HistogramShape::TwoD(pt_axis(), Binning::uniform(7100, (-1.0, 70.0)))
            }
            HistogramId::PhiEta { .. } => HistogramShape::TwoD(
                Binning::uniform(600, PHI_LIMITS),
                Binning::uniform(300, (-0.82, 0.82)),
            ),
            HistogramId::DeuteronPhiPt(_) | HistogramId::Correlation { .. } => {
                HistogramShape::TwoD(pt_axis(), phi_axis())
            }
            HistogramId::TriggerPhiPt { .. } => HistogramShape::TwoD(
                Binning::geometric(TRIGGER_PT_BINS, PT_START, PT_RATIO),
                phi_axis(),
            ),
        }
    }
}

impl Display for HistogramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The destination of the analysis increments.
///
/// Implementors decide what an increment means; the analysis only ever adds one count at the given
/// coordinates.
pub trait Sink {
    /// Add one count at `x` to a one-dimensional accumulator.
    fn fill(&mut self, id: HistogramId, x: f64);
    /// Add one count at `(x, y)` to a two-dimensional accumulator.
    fn fill_2d(&mut self, id: HistogramId, x: f64, y: f64);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn fill(&mut self, id: HistogramId, x: f64) {
        (**self).fill(id, x)
    }
    fn fill_2d(&mut self, id: HistogramId, x: f64, y: f64) {
        (**self).fill_2d(id, x, y)
    }
}

/// A stored accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Histogram {
    /// A one-dimensional histogram.
    OneD(Histogram1D),
    /// A two-dimensional histogram.
    TwoD(Histogram2D),
}

impl Histogram {
    fn new(shape: HistogramShape) -> Self {
        match shape {
            HistogramShape::OneD(x) => Histogram::OneD(Histogram1D::new(x)),
            HistogramShape::TwoD(x, y) => Histogram::TwoD(Histogram2D::new(x, y)),
        }
    }

    /// The one-dimensional histogram, if this is one.
    pub fn as_1d(&self) -> Option<&Histogram1D> {
        match self {
            Histogram::OneD(h) => Some(h),
            Histogram::TwoD(_) => None,
        }
    }

    /// The two-dimensional histogram, if this is one.
    pub fn as_2d(&self) -> Option<&Histogram2D> {
        match self {
            Histogram::TwoD(h) => Some(h),
            Histogram::OneD(_) => None,
        }
    }

    /// Number of fill calls.
    pub fn entries(&self) -> u64 {
        match self {
            Histogram::OneD(h) => h.entries(),
            Histogram::TwoD(h) => h.entries(),
        }
    }

    fn merge(&mut self, other: &Self) {
        match (self, other) {
            (Histogram::OneD(a), Histogram::OneD(b)) => a.merge(b),
            (Histogram::TwoD(a), Histogram::TwoD(b)) => a.merge(b),
            _ => panic!("Cannot merge histograms of different dimension!"),
        }
    }
}

/// One histogram for each [`HistogramId`], in the order of [`HistogramId::all`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSet {
    histograms: IndexMap<HistogramId, Histogram>,
}

impl Default for HistogramSet {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramSet {
    /// An empty set with the default binning for every accumulator.
    pub fn new() -> Self {
        Self {
            histograms: HistogramId::all()
                .into_iter()
                .map(|id| (id, Histogram::new(id.shape())))
                .collect(),
        }
    }

    /// The accumulator for `id`.
    pub fn get(&self, id: HistogramId) -> Option<&Histogram> {
        self.histograms.get(&id)
    }

    /// The one-dimensional accumulator for `id`.
    pub fn get_1d(&self, id: HistogramId) -> Option<&Histogram1D> {
        self.get(id).and_then(Histogram::as_1d)
    }

    /// The two-dimensional accumulator for `id`.
    pub fn get_2d(&self, id: HistogramId) -> Option<&Histogram2D> {
        self.get(id).and_then(Histogram::as_2d)
    }

    /// Look an accumulator up by its conventional name.
    pub fn get_by_name(&self, name: &str) -> Option<&Histogram> {
        self.histograms
            .iter()
            .find(|(id, _)| id.name() == name)
            .map(|(_, h)| h)
    }

    /// Iterate over `(id, histogram)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&HistogramId, &Histogram)> {
        self.histograms.iter()
    }

    /// Number of accumulators.
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// Returns `true` if the set holds no accumulators.
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Add every accumulator of `other` to the matching one in this set.
    pub fn merge(&mut self, other: &Self) {
        for (id, histogram) in &other.histograms {
            match self.histograms.get_mut(id) {
                Some(existing) => existing.merge(histogram),
                None => {
                    self.histograms.insert(*id, histogram.clone());
                }
            }
        }
    }
}

impl Sink for HistogramSet {
    fn fill(&mut self, id: HistogramId, x: f64) {
        if let Some(Histogram::OneD(h)) = self.histograms.get_mut(&id) {
            h.fill(x);
        }
    }

    fn fill_2d(&mut self, id: HistogramId, x: f64, y: f64) {
        if let Some(Histogram::TwoD(h)) = self.histograms.get_mut(&id) {
            h.fill(x, y);
        }
    }
}

impl_op_ex!(+ |a: &HistogramSet, b: &HistogramSet| -> HistogramSet {
    let mut sum = a.clone();
    sum.merge(b);
    sum
});

/// A [`Sink`] which may be filled from several threads at once.
///
/// Each fill takes the lock for the duration of one increment.
#[derive(Debug, Default)]
pub struct SharedSink<S> {
    inner: Mutex<S>,
}

impl<S: Sink> SharedSink<S> {
    /// Wrap `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            inner: Mutex::new(sink),
        }
    }

    /// Add one count at `x`.
    pub fn fill(&self, id: HistogramId, x: f64) {
        self.inner.lock().fill(id, x)
    }

    /// Add one count at `(x, y)`.
    pub fn fill_2d(&self, id: HistogramId, x: f64, y: f64) {
        self.inner.lock().fill_2d(id, x, y)
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

impl<S: Sink> Sink for &SharedSink<S> {
    fn fill(&mut self, id: HistogramId, x: f64) {
        SharedSink::fill(self, id, x)
    }
    fn fill_2d(&mut self, id: HistogramId, x: f64, y: f64) {
        SharedSink::fill_2d(self, id, x, y)
    }
}
