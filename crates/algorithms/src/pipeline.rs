//! End-to-end coastline extraction
//!
//! Strict stage order over a loaded scene:
//!
//! 1. NDWI water index from the green and NIR bands
//! 2. Otsu threshold over the valid index values
//! 3. Binary mask, then largest-component cleaning
//! 4. Vectorization into world-coordinate polygons
//! 5. GeoJSON feature-collection assembly
//!
//! A scene with no valid pixels is a fatal error; a scene where no pixel
//! exceeds the threshold is a normal run that reports an empty result.

use tracing::{debug, info, warn};

use shoreline_core::io::Scene;
use shoreline_core::Result;

use crate::imagery::{ndwi, IndexParams};
use crate::segmentation::{
    binary_water_mask, keep_largest_component, otsu_threshold, valid_index_values, OtsuParams,
};
use crate::vector::{feature_collection, vectorize_mask, FeatureCollection, VectorizeParams};

/// Parameters for the full extraction pipeline
#[derive(Debug, Clone, Default)]
pub struct CoastlineParams {
    pub index: IndexParams,
    pub otsu: OtsuParams,
    pub vectorize: VectorizeParams,
}

/// Outcome classification of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// Water found and every assembled polygon exported
    Extracted,
    /// Run completed but nothing qualified for export
    Empty,
    /// Water exported, but some boundary rings had to be discarded
    ExtractedWithDrops,
}

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub struct CoastlineReport {
    /// Threshold selected by Otsu's method
    pub threshold: f64,
    /// Pixel area of the retained water component (0 when none)
    pub water_pixels: usize,
    /// Boundary rings discarded during polygon assembly
    pub dropped_polygons: usize,
    /// Exported feature collection (possibly empty)
    pub collection: FeatureCollection,
    pub status: ExtractionStatus,
}

/// Run the full extraction pipeline on a scene.
///
/// Errors are fatal conditions only: shape mismatches and a scene without
/// any valid pixels. "No water detected" is not an error; it returns an
/// empty collection with [`ExtractionStatus::Empty`].
pub fn extract_coastline(scene: &Scene, params: &CoastlineParams) -> Result<CoastlineReport> {
    let index = ndwi(&scene.green, &scene.nir, &params.index)?;

    let values = valid_index_values(&index, &scene.validity)?;
    let threshold = otsu_threshold(&values, &params.otsu)?;
    debug!(
        threshold,
        valid_pixels = values.len(),
        "selected water threshold"
    );

    let mask = binary_water_mask(&index, &scene.validity, threshold)?;
    let (cleaned, region) = keep_largest_component(&mask)?;

    let crs_name = scene.crs_name();
    let region = match region {
        Some(region) => region,
        None => {
            info!(threshold, "no pixels above threshold, nothing to extract");
            return Ok(CoastlineReport {
                threshold,
                water_pixels: 0,
                dropped_polygons: 0,
                collection: feature_collection(&[], &crs_name),
                status: ExtractionStatus::Empty,
            });
        }
    };
    debug!(area = region.area, "retained largest water component");

    let (polygons, dropped) = vectorize_mask(&cleaned, &params.vectorize)?;
    if dropped > 0 {
        warn!(dropped, "discarded boundary rings during vectorization");
    }

    let status = if polygons.is_empty() {
        ExtractionStatus::Empty
    } else if dropped > 0 {
        ExtractionStatus::ExtractedWithDrops
    } else {
        ExtractionStatus::Extracted
    };

    let collection = feature_collection(&polygons, &crs_name);
    info!(
        features = collection.len(),
        water_pixels = region.area,
        "extraction finished"
    );

    Ok(CoastlineReport {
        threshold,
        water_pixels: region.area,
        dropped_polygons: dropped,
        collection,
        status,
    })
}
