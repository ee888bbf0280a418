use std::collections::BTreeMap;

use accurate::{sum::Klein, traits::*};
use auto_ops::impl_op_ex;

use crate::utils::{get_bin_edges, get_bin_index, get_bin_index_from_edges, get_geometric_bin_edges};

/// The binning of one histogram axis.
#[derive(Clone, Debug, PartialEq)]
pub enum Binning {
    /// `bins` evenly spaced bins over `limits` (lower edge inclusive, upper edge exclusive).
    Uniform {
        /// Number of bins
        bins: usize,
        /// Lower and upper edge of the axis
        limits: (f64, f64),
    },
    /// Arbitrary sorted bin edges (`n_bins + 1` values).
    Edges(Vec<f64>),
}

impl Binning {
    /// Evenly spaced bins.
    pub fn uniform(bins: usize, limits: (f64, f64)) -> Self {
        assert!(bins > 0, "Number of bins must be greater than zero!");
        assert!(
            limits.1 > limits.0,
            "The lower edge of the range must be smaller than the upper edge!"
        );
        Self::Uniform { bins, limits }
    }

    /// Bins growing by a constant `ratio`, starting at `start`.
    ///
    /// # See Also
    /// [`get_geometric_bin_edges`]
    pub fn geometric(bins: usize, start: f64, ratio: f64) -> Self {
        assert!(bins > 0, "Number of bins must be greater than zero!");
        assert!(
            start > 0.0 && ratio > 1.0,
            "Geometric bins need a positive start and a ratio above one!"
        );
        Self::Edges(get_geometric_bin_edges(bins, start, ratio))
    }

    /// Number of bins on this axis.
    pub fn n_bins(&self) -> usize {
        match self {
            Binning::Uniform { bins, .. } => *bins,
            Binning::Edges(edges) => edges.len().saturating_sub(1),
        }
    }

    /// The lowest and highest edge of the axis.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Binning::Uniform { limits, .. } => *limits,
            Binning::Edges(edges) => (
                edges.first().copied().unwrap_or(f64::NAN),
                edges.last().copied().unwrap_or(f64::NAN),
            ),
        }
    }

    /// All bin edges of the axis.
    pub fn edges(&self) -> Vec<f64> {
        match self {
            Binning::Uniform { bins, limits } => get_bin_edges(*bins, *limits),
            Binning::Edges(edges) => edges.clone(),
        }
    }

    /// The bin containing `value`, if it is on the axis.
    pub fn index(&self, value: f64) -> Option<usize> {
        match self {
            Binning::Uniform { bins, limits } => get_bin_index(value, *bins, *limits),
            Binning::Edges(edges) => get_bin_index_from_edges(value, edges),
        }
    }
}

/// A one-dimensional histogram with dense storage.
///
/// Values below the axis go to the underflow, values above to the overflow, and NaN values are
/// tallied separately as invalid. Every call to [`Histogram1D::fill`] counts as one entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram1D {
    binning: Binning,
    counts: Vec<f64>,
    underflow: f64,
    overflow: f64,
    invalid: f64,
    entries: u64,
}

impl Histogram1D {
    /// An empty histogram with the given binning.
    pub fn new(binning: Binning) -> Self {
        let counts = vec![0.0; binning.n_bins()];
        Self {
            binning,
            counts,
            underflow: 0.0,
            overflow: 0.0,
            invalid: 0.0,
            entries: 0,
        }
    }

    /// Increment the bin containing `x` by one.
    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0)
    }

    /// Increment the bin containing `x` by `weight`.
    pub fn fill_weighted(&mut self, x: f64, weight: f64) {
        self.entries += 1;
        if x.is_nan() {
            self.invalid += weight;
            return;
        }
        match self.binning.index(x) {
            Some(index) => self.counts[index] += weight,
            None if x < self.binning.range().0 => self.underflow += weight,
            None => self.overflow += weight,
        }
    }

    /// The axis binning.
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// In-range bin contents.
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Content of a single bin (zero for bins off the axis).
    pub fn bin_content(&self, index: usize) -> f64 {
        self.counts.get(index).copied().unwrap_or(0.0)
    }

    /// Content of the bin containing `x`, if it is on the axis.
    pub fn content_at(&self, x: f64) -> Option<f64> {
        self.binning.index(x).map(|index| self.counts[index])
    }

    /// Weight collected below the axis.
    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    /// Weight collected above the axis.
    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Weight of NaN fills.
    pub fn invalid(&self) -> f64 {
        self.invalid
    }

    /// Number of fill calls.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Compensated sum of the in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.counts
            .iter()
            .copied()
            .sum_with_accumulator::<Klein<f64>>()
    }

    /// Add the contents of `other` to this histogram.
    ///
    /// # Panics
    ///
    /// Panics if the two histograms are binned differently.
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(
            self.binning, other.binning,
            "Only histograms with identical binning can be merged!"
        );
        self.counts
            .iter_mut()
            .zip(&other.counts)
            .for_each(|(a, b)| *a += b);
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.invalid += other.invalid;
        self.entries += other.entries;
    }
}

impl_op_ex!(+ |a: &Histogram1D, b: &Histogram1D| -> Histogram1D {
    let mut sum = a.clone();
    sum.merge(b);
    sum
});

/// A two-dimensional histogram with sparse storage.
///
/// Only bins which received at least one fill are stored, so wide binnings (thousands of bins
/// per axis) stay cheap. A fill that misses either axis (or is NaN on either axis) is tallied
/// in [`Histogram2D::out_of_range`].
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram2D {
    x_binning: Binning,
    y_binning: Binning,
    counts: BTreeMap<(usize, usize), f64>,
    out_of_range: f64,
    entries: u64,
}

impl Histogram2D {
    /// An empty histogram with the given binnings.
    pub fn new(x_binning: Binning, y_binning: Binning) -> Self {
        Self {
            x_binning,
            y_binning,
            counts: BTreeMap::new(),
            out_of_range: 0.0,
            entries: 0,
        }
    }

    /// Increment the bin containing `(x, y)` by one.
    pub fn fill(&mut self, x: f64, y: f64) {
        self.fill_weighted(x, y, 1.0)
    }

    /// Increment the bin containing `(x, y)` by `weight`.
    pub fn fill_weighted(&mut self, x: f64, y: f64, weight: f64) {
        self.entries += 1;
        match (self.x_binning.index(x), self.y_binning.index(y)) {
            (Some(ix), Some(iy)) => *self.counts.entry((ix, iy)).or_insert(0.0) += weight,
            _ => self.out_of_range += weight,
        }
    }

    /// The x-axis binning.
    pub fn x_binning(&self) -> &Binning {
        &self.x_binning
    }

    /// The y-axis binning.
    pub fn y_binning(&self) -> &Binning {
        &self.y_binning
    }

    /// Content of bin `(ix, iy)`.
    pub fn bin_content(&self, ix: usize, iy: usize) -> f64 {
        self.counts.get(&(ix, iy)).copied().unwrap_or(0.0)
    }

    /// Content of the bin containing `(x, y)`, if it is inside both axes.
    pub fn content_at(&self, x: f64, y: f64) -> Option<f64> {
        let ix = self.x_binning.index(x)?;
        let iy = self.y_binning.index(y)?;
        Some(self.bin_content(ix, iy))
    }

    /// Weight of fills outside the axes.
    pub fn out_of_range(&self) -> f64 {
        self.out_of_range
    }

    /// Number of fill calls.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Compensated sum of the in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.counts
            .values()
            .copied()
            .sum_with_accumulator::<Klein<f64>>()
    }

    /// Add the contents of `other` to this histogram.
    ///
    /// # Panics
    ///
    /// Panics if the two histograms are binned differently.
    pub fn merge(&mut self, other: &Self) {
        assert!(
            self.x_binning == other.x_binning && self.y_binning == other.y_binning,
            "Only histograms with identical binning can be merged!"
        );
        for (key, content) in &other.counts {
            *self.counts.entry(*key).or_insert(0.0) += content;
        }
        self.out_of_range += other.out_of_range;
        self.entries += other.entries;
    }
}

impl_op_ex!(+ |a: &Histogram2D, b: &Histogram2D| -> Histogram2D {
    let mut sum = a.clone();
    sum.merge(b);
    sum
});
