//! # Shoreline Core
//!
//! Core types and I/O for the shoreline extraction toolkit.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `CRS`: Coordinate Reference System handling
//! - `Scene`: Paired green/NIR reflectance bands with a validity mask
//! - Native GeoTIFF reading for multiband scenes

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use io::Scene;
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::io::Scene;
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
