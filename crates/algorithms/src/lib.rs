//! # Shoreline Algorithms
//!
//! The coastline extraction pipeline:
//!
//! - **imagery**: water-sensitive spectral index (NDWI)
//! - **segmentation**: Otsu adaptive thresholding + connected-component
//!   noise suppression
//! - **vector**: mask boundary tracing into world-coordinate polygons and
//!   GeoJSON feature-collection assembly
//! - **pipeline**: strict Index → Threshold → Clean → Vectorize → Export
//!   orchestration
//!
//! Every stage is a pure function of its inputs; nothing is retained
//! between runs, so independent scenes can be processed concurrently by
//! issuing independent invocations.

mod maybe_rayon;

pub mod imagery;
pub mod pipeline;
pub mod segmentation;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{ndwi, IndexParams};
    pub use crate::pipeline::{extract_coastline, CoastlineParams, CoastlineReport, ExtractionStatus};
    pub use crate::segmentation::{
        binary_water_mask, keep_largest_component, label_components, otsu_threshold, OtsuParams,
    };
    pub use crate::vector::{feature_collection, vectorize_mask, FeatureCollection, VectorizeParams};
    pub use shoreline_core::prelude::*;
}
