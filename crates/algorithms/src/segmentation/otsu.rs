//! Otsu adaptive threshold selection
//!
//! Histogram-based split-point selection maximizing between-class variance,
//! run over the water-index values of valid pixels only.

use shoreline_core::raster::Raster;
use shoreline_core::{Error, Result};

/// Parameters for Otsu threshold selection
#[derive(Debug, Clone)]
pub struct OtsuParams {
    /// Number of histogram bins over the observed value range
    pub bins: usize,
}

impl Default for OtsuParams {
    fn default() -> Self {
        Self { bins: 256 }
    }
}

/// Collect the index values eligible for threshold selection: pixels where
/// the validity mask holds and the index is not NaN.
pub fn valid_index_values(index: &Raster<f64>, validity: &Raster<u8>) -> Result<Vec<f64>> {
    if index.shape() != validity.shape() {
        return Err(Error::SizeMismatch {
            er: index.rows(),
            ec: index.cols(),
            ar: validity.rows(),
            ac: validity.cols(),
        });
    }

    let (rows, cols) = index.shape();
    let mut values = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            if unsafe { validity.get_unchecked(row, col) } != 1 {
                continue;
            }
            let v = unsafe { index.get_unchecked(row, col) };
            if !v.is_nan() {
                values.push(v);
            }
        }
    }
    Ok(values)
}

/// Select the threshold maximizing between-class variance (Otsu's method).
///
/// The observed [min, max] range is partitioned into `params.bins` bins;
/// every interior bin boundary is a candidate split. For each candidate the
/// between-class variance of the two partitions (below vs. at-or-above the
/// split) is computed, weighted by partition size, and the maximizing split
/// is returned. Ties resolve to the lowest candidate value.
///
/// Degenerate input (all values identical) returns that single value.
/// Empty input is an `EmptyValidData` error.
pub fn otsu_threshold(values: &[f64], params: &OtsuParams) -> Result<f64> {
    if params.bins < 2 {
        return Err(Error::InvalidParameter {
            name: "bins",
            value: params.bins.to_string(),
            reason: "at least 2 histogram bins required".to_string(),
        });
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut count = 0usize;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
        count += 1;
    }

    if count == 0 {
        return Err(Error::EmptyValidData);
    }
    if min == max {
        // Single-valued distribution: any threshold is acceptable
        return Ok(min);
    }

    let bins = params.bins;
    let range = max - min;
    let bin_width = range / bins as f64;

    let mut histogram = vec![0usize; bins];
    for &v in values {
        if v.is_nan() {
            continue;
        }
        let bin = (((v - min) / range) * bins as f64) as usize;
        histogram[bin.min(bins - 1)] += 1;
    }

    // Class means computed from bin centers
    let total = count as f64;
    let mut total_mass = 0.0;
    for (i, &c) in histogram.iter().enumerate() {
        let center = min + (i as f64 + 0.5) * bin_width;
        total_mass += center * c as f64;
    }

    let mut best_variance = f64::NEG_INFINITY;
    let mut best_threshold = min;
    let mut weight_below = 0.0;
    let mut mass_below = 0.0;

    // Candidates are interior bin boundaries, visited in ascending order so
    // strict-greater updates resolve ties to the lowest candidate.
    for t in 1..bins {
        let c = histogram[t - 1] as f64;
        weight_below += c;
        mass_below += (min + (t as f64 - 0.5) * bin_width) * c;

        let weight_above = total - weight_below;
        if weight_below == 0.0 || weight_above == 0.0 {
            continue;
        }

        let mean_below = mass_below / weight_below;
        let mean_above = (total_mass - mass_below) / weight_above;
        let variance = weight_below * weight_above * (mean_below - mean_above).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_threshold = min + t as f64 * bin_width;
        }
    }

    Ok(best_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_fails() {
        let result = otsu_threshold(&[], &OtsuParams::default());
        assert!(matches!(result, Err(Error::EmptyValidData)));
    }

    #[test]
    fn test_all_identical_returns_value() {
        let values = vec![-0.5; 1000];
        let t = otsu_threshold(&values, &OtsuParams::default()).unwrap();
        assert_eq!(t, -0.5);
    }

    #[test]
    fn test_bimodal_split_between_modes() {
        // 8000 land pixels at -0.5, 2000 water pixels at 0.78
        let mut values = vec![-0.5; 8000];
        values.extend(std::iter::repeat(0.78).take(2000));

        let t = otsu_threshold(&values, &OtsuParams::default()).unwrap();
        assert!(
            t > -0.5 && t < 0.78,
            "threshold {} should fall strictly between the modes",
            t
        );
    }

    #[test]
    fn test_threshold_maximizes_between_class_variance() {
        // Exhaustively recompute the variance for every candidate and check
        // no candidate strictly beats the returned split.
        let values: Vec<f64> = (0..500)
            .map(|i| if i % 5 == 0 { 0.6 } else { -0.3 + (i % 7) as f64 * 0.01 })
            .collect();
        let params = OtsuParams { bins: 64 };
        let t = otsu_threshold(&values, &params).unwrap();

        let variance_at = |split: f64| {
            let below: Vec<f64> = values.iter().copied().filter(|&v| v < split).collect();
            let above: Vec<f64> = values.iter().copied().filter(|&v| v >= split).collect();
            if below.is_empty() || above.is_empty() {
                return f64::NEG_INFINITY;
            }
            let mb = below.iter().sum::<f64>() / below.len() as f64;
            let ma = above.iter().sum::<f64>() / above.len() as f64;
            below.len() as f64 * above.len() as f64 * (mb - ma).powi(2)
        };

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / params.bins as f64;

        let chosen = variance_at(t);
        for i in 1..params.bins {
            let candidate = min + i as f64 * width;
            assert!(
                variance_at(candidate) <= chosen + 1e-6,
                "candidate {} beats returned threshold {}",
                candidate,
                t
            );
        }
    }

    #[test]
    fn test_nan_values_ignored() {
        let mut values = vec![0.0; 100];
        values.extend(std::iter::repeat(1.0).take(100));
        values.push(f64::NAN);

        let t = otsu_threshold(&values, &OtsuParams::default()).unwrap();
        assert!(t > 0.0 && t < 1.0);
    }

    #[test]
    fn test_too_few_bins() {
        let result = otsu_threshold(&[1.0, 2.0], &OtsuParams { bins: 1 });
        assert!(result.is_err());
    }
}
