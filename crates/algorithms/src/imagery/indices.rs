//! Water-sensitive spectral indices
//!
//! Indices operate on single-band rasters (one band per raster). Output
//! pixels where either input is nodata are NaN; everywhere else the
//! epsilon-guarded denominator keeps the result finite, even when both
//! bands are zero.

use crate::maybe_rayon::*;
use ndarray::Array2;
use shoreline_core::raster::Raster;
use shoreline_core::{Error, Result};

/// Division-guard constant added to normalized-difference denominators.
///
/// Kept explicit (rather than an inline literal) so numeric behavior is
/// auditable and testable on its own.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Parameters for normalized-difference indices
#[derive(Debug, Clone)]
pub struct IndexParams {
    /// Constant added to the denominator to avoid division by zero
    pub epsilon: f64,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Compute the epsilon-guarded normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b + ε)`
///
/// Result is nominally in [-1, 1]. Pixels where either band is nodata are
/// NaN; degenerate denominators yield a defined finite value instead of an
/// error.
pub fn normalized_difference(
    band_a: &Raster<f64>,
    band_b: &Raster<f64>,
    params: &IndexParams,
) -> Result<Raster<f64>> {
    check_dimensions(band_a, band_b)?;

    let (rows, cols) = band_a.shape();
    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();
    let epsilon = params.epsilon;

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if is_nodata_f64(a, nodata_a) || is_nodata_f64(b, nodata_b) {
                    continue;
                }

                row_data[col] = (a - b) / (a + b + epsilon);
            }
            row_data
        })
        .collect();

    build_output(band_a, rows, cols, data)
}

/// Normalized Difference Water Index (McFeeters, 1996)
///
/// `NDWI = (Green - NIR) / (Green + NIR + ε)`
///
/// High over open water, low over vegetation and bare land.
pub fn ndwi(green: &Raster<f64>, nir: &Raster<f64>, params: &IndexParams) -> Result<Raster<f64>> {
    normalized_difference(green, nir, params)
}

fn is_nodata_f64(value: f64, nodata: Option<f64>) -> bool {
    if value.is_nan() {
        return true;
    }
    match nodata {
        Some(nd) => (value - nd).abs() < f64::EPSILON,
        None => false,
    }
}

fn check_dimensions(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

fn build_output(
    template: &Raster<f64>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Raster<f64>> {
    let mut output = template.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use shoreline_core::GeoTransform;

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    #[test]
    fn test_ndwi_water_positive() {
        let green = make_band(5, 5, 0.4);
        let nir = make_band(5, 5, 0.05);

        let result = ndwi(&green, &nir, &IndexParams::default()).unwrap();
        let val = result.get(2, 2).unwrap();

        let expected = (0.4 - 0.05) / (0.4 + 0.05 + DEFAULT_EPSILON);
        assert_relative_eq!(val, expected, epsilon = 1e-12);
        assert!(val > 0.0);
    }

    #[test]
    fn test_equal_bands_near_zero() {
        // green == nir everywhere → index within epsilon of zero
        let green = make_band(10, 10, 0.3);
        let nir = make_band(10, 10, 0.3);

        let result = ndwi(&green, &nir, &IndexParams::default()).unwrap();
        for row in 0..10 {
            for col in 0..10 {
                let val = result.get(row, col).unwrap();
                assert!(val.abs() <= DEFAULT_EPSILON, "index {} not near zero", val);
            }
        }
    }

    #[test]
    fn test_zero_bands_finite() {
        // Both bands zero: epsilon keeps the result finite, not NaN/inf
        let green = make_band(3, 3, 0.0);
        let nir = make_band(3, 3, 0.0);

        let result = ndwi(&green, &nir, &IndexParams::default()).unwrap();
        let val = result.get(1, 1).unwrap();
        assert!(val.is_finite(), "Expected finite value, got {}", val);
        assert_eq!(val, 0.0);
    }

    #[test]
    fn test_nodata_propagates_as_nan() {
        let mut green = make_band(5, 5, 0.4);
        green.set_nodata(Some(-9999.0));
        green.set(2, 2, -9999.0).unwrap();

        let nir = make_band(5, 5, 0.1);

        let result = ndwi(&green, &nir, &IndexParams::default()).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
        assert!(!result.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = make_band(5, 5, 1.0);
        let b = make_band(5, 10, 1.0);

        assert!(normalized_difference(&a, &b, &IndexParams::default()).is_err());
    }

    #[test]
    fn test_custom_epsilon() {
        let green = make_band(2, 2, 1.0);
        let nir = make_band(2, 2, 0.0);

        let result = ndwi(&green, &nir, &IndexParams { epsilon: 1.0 }).unwrap();
        assert_relative_eq!(result.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
    }
}
