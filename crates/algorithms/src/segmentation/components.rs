//! Binary mask construction and connected-component cleaning
//!
//! Thresholding the water index produces a raw mask that usually contains
//! scattered false positives (shadows, wet sand). Labeling the mask with
//! 8-connectivity and keeping only the largest component isolates the main
//! water body before vectorization.

use shoreline_core::raster::Raster;
use shoreline_core::{Error, Result};

/// The largest connected region found in a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LargestRegion {
    /// Label of the region in the labeled raster
    pub label: i32,
    /// Area in pixels
    pub area: usize,
}

/// Build the binary water mask: 1 where the index strictly exceeds the
/// threshold on a valid pixel, 0 everywhere else. NaN index values never
/// pass the comparison.
pub fn binary_water_mask(
    index: &Raster<f64>,
    validity: &Raster<u8>,
    threshold: f64,
) -> Result<Raster<u8>> {
    if index.shape() != validity.shape() {
        return Err(Error::SizeMismatch {
            er: index.rows(),
            ec: index.cols(),
            ar: validity.rows(),
            ac: validity.cols(),
        });
    }

    let (rows, cols) = index.shape();
    let mut mask = index.with_same_meta::<u8>(rows, cols);

    for row in 0..rows {
        for col in 0..cols {
            let valid = unsafe { validity.get_unchecked(row, col) } == 1;
            let v = unsafe { index.get_unchecked(row, col) };
            if valid && v > threshold {
                mask.set(row, col, 1)?;
            }
        }
    }

    Ok(mask)
}

/// Label the 8-connected components of a binary mask.
///
/// Two-pass algorithm: the first pass assigns provisional labels and records
/// equivalences in a union-find forest; the second pass resolves them to
/// consecutive labels 1..=count in row-major discovery order. Background
/// pixels keep label 0.
pub fn label_components(mask: &Raster<u8>) -> Result<(Raster<i32>, usize)> {
    let (rows, cols) = mask.shape();
    let mut labels = mask.with_same_meta::<i32>(rows, cols);
    let mut parent: Vec<usize> = vec![0]; // parent[0] reserved for background
    let mut next_label = 1usize;

    // First pass: provisional labels from already-visited neighbors
    // (left, up-left, up, up-right under row-major scan order).
    let mut provisional = vec![0usize; rows * cols];
    for row in 0..rows {
        for col in 0..cols {
            if unsafe { mask.get_unchecked(row, col) } != 1 {
                continue;
            }

            let mut neighbor_min = usize::MAX;
            let mut neighbors = [0usize; 4];
            let mut n = 0;

            if col > 0 {
                neighbors[n] = provisional[row * cols + col - 1];
                n += 1;
            }
            if row > 0 {
                if col > 0 {
                    neighbors[n] = provisional[(row - 1) * cols + col - 1];
                    n += 1;
                }
                neighbors[n] = provisional[(row - 1) * cols + col];
                n += 1;
                if col + 1 < cols {
                    neighbors[n] = provisional[(row - 1) * cols + col + 1];
                    n += 1;
                }
            }

            for &label in &neighbors[..n] {
                if label != 0 && label < neighbor_min {
                    neighbor_min = label;
                }
            }

            let label = if neighbor_min == usize::MAX {
                parent.push(next_label);
                let l = next_label;
                next_label += 1;
                l
            } else {
                for &label in &neighbors[..n] {
                    if label != 0 {
                        union(&mut parent, neighbor_min, label);
                    }
                }
                neighbor_min
            };

            provisional[row * cols + col] = label;
        }
    }

    // Second pass: map union-find roots to consecutive labels in the order
    // they are first encountered, so labeling is deterministic.
    let mut root_to_label = vec![0i32; next_label];
    let mut count = 0usize;
    for row in 0..rows {
        for col in 0..cols {
            let p = provisional[row * cols + col];
            if p == 0 {
                continue;
            }
            let root = find(&mut parent, p);
            if root_to_label[root] == 0 {
                count += 1;
                root_to_label[root] = count as i32;
            }
            labels.set(row, col, root_to_label[root])?;
        }
    }

    Ok((labels, count))
}

/// Pixel counts per label; index 0 holds the background count.
pub fn region_areas(labels: &Raster<i32>, count: usize) -> Vec<usize> {
    let (rows, cols) = labels.shape();
    let mut areas = vec![0usize; count + 1];
    for row in 0..rows {
        for col in 0..cols {
            let label = unsafe { labels.get_unchecked(row, col) };
            areas[label as usize] += 1;
        }
    }
    areas
}

/// Keep only the largest connected component of a binary mask.
///
/// Returns the cleaned mask and the retained region, or `None` when the
/// input mask has no foreground pixels at all (the cleaned mask is then
/// all-zero). When several components share the maximal area, the one with
/// the lowest label (earliest in row-major discovery order) wins.
pub fn keep_largest_component(mask: &Raster<u8>) -> Result<(Raster<u8>, Option<LargestRegion>)> {
    let (labels, count) = label_components(mask)?;
    let (rows, cols) = mask.shape();

    if count == 0 {
        return Ok((mask.with_same_meta::<u8>(rows, cols), None));
    }

    let areas = region_areas(&labels, count);
    let mut largest = LargestRegion { label: 1, area: areas[1] };
    for (label, &area) in areas.iter().enumerate().skip(2) {
        // Strict greater-than keeps the lowest label on ties
        if area > largest.area {
            largest = LargestRegion {
                label: label as i32,
                area,
            };
        }
    }

    let mut cleaned = mask.with_same_meta::<u8>(rows, cols);
    for row in 0..rows {
        for col in 0..cols {
            if unsafe { labels.get_unchecked(row, col) } == largest.label {
                cleaned.set(row, col, 1)?;
            }
        }
    }

    Ok((cleaned, Some(largest)))
}

fn find(parent: &mut Vec<usize>, mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]]; // path halving
        x = parent[x];
    }
    x
}

fn union(parent: &mut Vec<usize>, a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Attach the higher root to the lower, keeping the earliest
        // provisional label as representative
        if ra < rb {
            parent[rb] = ra;
        } else {
            parent[ra] = rb;
        }
    }
}
