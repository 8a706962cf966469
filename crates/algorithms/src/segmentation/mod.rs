//! Segmentation of the water index into a clean binary mask
//!
//! Two stages:
//! - **otsu**: adaptive threshold selection over the valid index values
//! - **components**: 8-connected labeling and largest-component selection
//!   to discard spurious fragments

mod components;
mod otsu;

pub use components::{
    binary_water_mask, keep_largest_component, label_components, region_areas, LargestRegion,
};
pub use otsu::{otsu_threshold, valid_index_values, OtsuParams};
