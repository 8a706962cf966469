//! Raster-to-vector conversion and GeoJSON export
//!
//! - **trace**: marching-squares boundary extraction in pixel space
//! - **polygonize**: world mapping, hole assignment, winding and area
//!   filtering into `geo::Polygon` geometries
//! - **geojson**: serialization to a GeoJSON feature collection

mod geojson;
mod polygonize;
mod trace;

pub use geojson::{feature_collection, Crs, Feature, FeatureCollection, Geometry};
pub use polygonize::{vectorize_mask, VectorizeParams, DEFAULT_MIN_AREA};
pub use trace::{ring_signed_area, trace_rings};
