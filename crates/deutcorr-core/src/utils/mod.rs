/// Azimuthal-angle folding used for single tracks and pair separations.
pub mod angles;
/// Useful enumerations for charges, species, detectors, and candidate categories.
pub mod enums;

/// A helper method to get histogram edges from evenly-spaced `bins` over a given `range`
/// # See Also
/// [`get_bin_index`]
pub fn get_bin_edges(bins: usize, range: (f64, f64)) -> Vec<f64> {
    let bin_width = (range.1 - range.0) / (bins as f64);
    (0..=bins)
        .map(|i| range.0 + (i as f64 * bin_width))
        .collect()
}

/// A helper method to get `bins + 1` histogram edges where each bin is wider than the previous
/// one by a constant `ratio`, starting at `start`.
///
/// This is the usual transverse-momentum binning: fine at low $`p_T`$ where the statistics are,
/// coarse at high $`p_T`$.
pub fn get_geometric_bin_edges(bins: usize, start: f64, ratio: f64) -> Vec<f64> {
    let mut edges = Vec::with_capacity(bins + 1);
    let mut edge = start;
    for _ in 0..=bins {
        edges.push(edge);
        edge *= ratio;
    }
    edges
}

/// A helper method to obtain the index of a bin where a value should go in a histogram with evenly
/// spaced `bins` over a given `range`
///
/// # See Also
/// [`get_bin_edges`]
pub fn get_bin_index(value: f64, bins: usize, limits: (f64, f64)) -> Option<usize> {
    if value >= limits.0 && value < limits.1 {
        let bin_width = (limits.1 - limits.0) / bins as f64;
        let bin_index = ((value - limits.0) / bin_width).floor() as usize;
        Some(bin_index.min(bins - 1))
    } else {
        None
    }
}

/// A helper method to obtain the index of the bin containing `value` given sorted bin `edges`
/// (lower edges inclusive, upper edges exclusive).
pub fn get_bin_index_from_edges(value: f64, edges: &[f64]) -> Option<usize> {
    let (first, last) = (*edges.first()?, *edges.last()?);
    if value >= first && value < last {
        Some(edges.partition_point(|edge| *edge <= value) - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_binning() {
        assert_eq!(get_bin_index(0.0, 3, (0.0, 1.0)), Some(0));
        assert_eq!(get_bin_index(0.1, 3, (0.0, 1.0)), Some(0));
        assert_eq!(get_bin_index(0.5, 3, (0.0, 1.0)), Some(1));
        assert_eq!(get_bin_index(0.9, 3, (0.0, 1.0)), Some(2));
        assert_eq!(get_bin_index(1.0, 3, (0.0, 1.0)), None);
        assert_eq!(get_bin_index(-0.1, 3, (0.0, 1.0)), None);
        assert_eq!(get_bin_index(f64::NAN, 3, (0.0, 1.0)), None);
        let edges = get_bin_edges(3, (0.0, 1.0));
        assert_eq!(edges.len(), 4);
        assert_relative_eq!(edges[1], 1.0 / 3.0);
        assert_relative_eq!(edges[3], 1.0);
    }

    #[test]
    fn test_geometric_edges() {
        let edges = get_geometric_bin_edges(800, 0.10, 1.005);
        assert_eq!(edges.len(), 801);
        assert_relative_eq!(edges[0], 0.10);
        assert_relative_eq!(edges[1], 0.1005);
        assert_relative_eq!(edges[800], 0.10 * 1.005f64.powi(800), max_relative = 1e-12);
        assert!(edges.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_binning_from_edges() {
        let edges = [0.0, 1.0, 3.0, 7.0];
        assert_eq!(get_bin_index_from_edges(0.0, &edges), Some(0));
        assert_eq!(get_bin_index_from_edges(0.99, &edges), Some(0));
        assert_eq!(get_bin_index_from_edges(1.0, &edges), Some(1));
        assert_eq!(get_bin_index_from_edges(6.5, &edges), Some(2));
        assert_eq!(get_bin_index_from_edges(7.0, &edges), None);
        assert_eq!(get_bin_index_from_edges(-1.0, &edges), None);
        assert_eq!(get_bin_index_from_edges(f64::INFINITY, &edges), None);
        assert_eq!(get_bin_index_from_edges(1.0, &[]), None);
    }
}
