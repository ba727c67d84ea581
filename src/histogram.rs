//! Uniform histogram of orientation samples.
//!
//! Binning follows the usual convention for a closed range `[min, max]`:
//! every bin is half-open except the last, which also takes samples equal to
//! `max`. Samples outside the range or non-finite are skipped. The histogram
//! only counts; drawing a rose plot from it is left to the caller.
use crate::error::{OrientationError, Result};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrientationHistogram {
    edges: Vec<f64>,
    counts: Vec<u64>,
}

impl OrientationHistogram {
    /// Bin `samples` into `bins` uniform bins over `[min, max]`.
    pub fn from_samples<I>(samples: I, bins: usize, min: f64, max: f64) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        if bins == 0 || !min.is_finite() || !max.is_finite() || min >= max {
            return Err(OrientationError::InvalidHistogramRange { bins, min, max });
        }
        let width = (max - min) / bins as f64;
        let mut edges: Vec<f64> = (0..bins).map(|i| min + width * i as f64).collect();
        edges.push(max);

        let mut counts = vec![0u64; bins];
        for v in samples {
            if !(v >= min && v <= max) {
                continue;
            }
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Ok(Self { edges, counts })
    }

    /// `bins + 1` monotonically increasing bin boundaries.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    /// Number of samples that landed inside the range.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn bin_centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|e| 0.5 * (e[0] + e[1])).collect()
    }

    /// Index of the fullest bin (first one on ties), `None` if nothing was counted.
    pub fn peak_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > 0 && best.map_or(true, |(_, b)| c > b) {
                best = Some((i, c));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Same histogram with edges mapped through `f` (e.g. radians → degrees).
    pub fn map_edges(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            edges: self.edges.iter().map(|&e| f(e)).collect(),
            counts: self.counts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn uniform_edges_and_inclusive_last_bin() {
        let h = OrientationHistogram::from_samples([0.0, 0.5, 1.0, 2.9, 3.0], 3, 0.0, 3.0)
            .expect("histogram");
        assert_eq!(h.edges(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(h.counts(), &[2, 1, 2]);
        assert_eq!(h.total(), 5);
        assert_eq!(h.bin_centers(), vec![0.5, 1.5, 2.5]);
    }

    #[test]
    fn out_of_range_and_nan_samples_are_skipped() {
        let h = OrientationHistogram::from_samples([-0.1, 0.2, f64::NAN, 4.0], 2, 0.0, 1.0)
            .expect("histogram");
        assert_eq!(h.counts(), &[1, 0]);
    }

    #[test]
    fn rejects_degenerate_ranges() {
        for (bins, lo, hi) in [(0, 0.0, 1.0), (4, 1.0, 1.0), (4, 2.0, 1.0), (4, 0.0, f64::INFINITY)] {
            assert!(matches!(
                OrientationHistogram::from_samples([0.5], bins, lo, hi),
                Err(OrientationError::InvalidHistogramRange { .. })
            ));
        }
    }

    #[test]
    fn peak_bin_and_degree_edges() {
        let samples = [0.1, 0.1, 1.6, 1.6, 1.6, 3.0];
        let h = OrientationHistogram::from_samples(samples, 36, 0.0, PI).expect("histogram");
        assert_eq!(h.bin_count(), 36);
        assert_eq!(h.peak_bin(), Some((1.6 / (PI / 36.0)) as usize));
        let deg = h.map_edges(f64::to_degrees);
        assert!((deg.edges()[36] - 180.0).abs() < 1e-9);
        assert!((deg.bin_width() - 5.0).abs() < 1e-9);
        assert_eq!(deg.counts(), h.counts());
    }

    #[test]
    fn empty_histogram_has_no_peak() {
        let h = OrientationHistogram::from_samples(std::iter::empty(), 4, 0.0, 1.0).expect("h");
        assert_eq!(h.peak_bin(), None);
        assert_eq!(h.total(), 0);
    }
}
