//! Imagery analysis
//!
//! Spectral index computation for water detection:
//! - NDWI (McFeeters): `(Green - NIR) / (Green + NIR + ε)`
//! - Generic epsilon-guarded normalized difference

mod indices;

pub use indices::{ndwi, normalized_difference, IndexParams, DEFAULT_EPSILON};
