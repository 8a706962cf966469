//! I/O operations for reading geospatial scenes
//!
//! Only the loader lives here; the analytical pipeline itself never touches
//! the filesystem.

mod native;

pub use native::{read_band, read_scene, SceneOptions};

use crate::error::{Error, Result};
use crate::raster::Raster;

/// A loaded two-band scene: green and near-infrared reflectance plus the
/// validity mask derived from their nodata values.
///
/// Georeferencing (transform and CRS) is carried on the band rasters.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Green reflectance band
    pub green: Raster<f64>,
    /// Near-infrared reflectance band
    pub nir: Raster<f64>,
    /// 1 where both bands carry real data, 0 at fill/nodata
    pub validity: Raster<u8>,
}

impl Scene {
    /// Build a scene from two same-shape bands, deriving the validity mask
    /// from each band's nodata value (NaN always counts as nodata).
    pub fn from_bands(green: Raster<f64>, nir: Raster<f64>) -> Result<Self> {
        if green.shape() != nir.shape() {
            return Err(Error::SizeMismatch {
                er: green.rows(),
                ec: green.cols(),
                ar: nir.rows(),
                ac: nir.cols(),
            });
        }

        let (rows, cols) = green.shape();
        let mut validity: Raster<u8> = green.with_same_meta(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                let g = unsafe { green.get_unchecked(row, col) };
                let n = unsafe { nir.get_unchecked(row, col) };
                if !green.is_nodata(g) && !nir.is_nodata(n) {
                    validity.set(row, col, 1)?;
                }
            }
        }

        Ok(Self {
            green,
            nir,
            validity,
        })
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.green.shape()
    }

    /// Number of valid pixels
    pub fn valid_count(&self) -> usize {
        self.validity.data().iter().filter(|&&v| v == 1).count()
    }

    /// CRS identifier string for export, `"unknown"` when the source
    /// carried none
    pub fn crs_name(&self) -> String {
        self.green
            .crs()
            .map(|c| c.identifier())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_shape_mismatch() {
        let green: Raster<f64> = Raster::new(4, 4);
        let nir: Raster<f64> = Raster::new(4, 5);
        assert!(Scene::from_bands(green, nir).is_err());
    }

    #[test]
    fn test_scene_validity_from_nodata() {
        let mut green: Raster<f64> = Raster::filled(3, 3, 0.2);
        let mut nir: Raster<f64> = Raster::filled(3, 3, 0.6);
        green.set_nodata(Some(-9999.0));
        nir.set_nodata(Some(-9999.0));
        green.set(0, 0, -9999.0).unwrap();
        nir.set(2, 2, f64::NAN).unwrap();

        let scene = Scene::from_bands(green, nir).unwrap();
        assert_eq!(scene.validity.get(0, 0).unwrap(), 0);
        assert_eq!(scene.validity.get(2, 2).unwrap(), 0);
        assert_eq!(scene.validity.get(1, 1).unwrap(), 1);
        assert_eq!(scene.valid_count(), 7);
    }
}
