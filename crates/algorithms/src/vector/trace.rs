//! Marching-squares boundary tracing over a binary mask
//!
//! Each 2x2 block of pixel samples forms a cell; the foreground pattern of
//! its corners selects directed boundary segments with foreground on the
//! left. Vertices sit at cell-edge midpoints, so every vertex has exactly
//! one incoming and one outgoing segment and the stitched rings are simple
//! by construction. Saddle cells resolve so diagonal foreground stays
//! connected, matching 8-connected component labeling.
//!
//! The mask is treated as padded with one ring of background, so boundary
//! components touching the raster edge still close. Coordinates are
//! fractional pixel positions (col, row); a pixel center is at integer
//! (col, row) and ring vertices fall on half-pixel offsets.

use std::collections::{HashMap, HashSet};

use shoreline_core::raster::Raster;

/// A boundary vertex in doubled pixel coordinates, so half-pixel midpoints
/// hash and compare exactly.
type Key = (i64, i64); // (2*col, 2*row)

/// Trace all boundary rings of a binary mask.
///
/// Returns closed rings of (col, row) pixel coordinates in deterministic
/// row-major discovery order. Rings around foreground run clockwise in
/// screen orientation (negative shoelace area with row as y); rings around
/// holes run the opposite way.
pub fn trace_rings(mask: &Raster<u8>) -> Vec<Vec<(f64, f64)>> {
    let (rows, cols) = mask.shape();
    let fg = |row: i64, col: i64| -> u8 {
        if row < 0 || col < 0 || row >= rows as i64 || col >= cols as i64 {
            return 0;
        }
        unsafe { mask.get_unchecked(row as usize, col as usize) }
    };

    // One outgoing segment per vertex; insertion order drives ring order.
    let mut next: HashMap<Key, Key> = HashMap::new();
    let mut starts: Vec<Key> = Vec::new();
    let mut emit = |from: Key, to: Key| {
        next.insert(from, to);
        starts.push(from);
    };

    for row in -1..rows as i64 {
        for col in -1..cols as i64 {
            let tl = fg(row, col);
            let tr = fg(row, col + 1);
            let br = fg(row + 1, col + 1);
            let bl = fg(row + 1, col);
            let case = tl * 8 + tr * 4 + br * 2 + bl;
            if case == 0 || case == 15 {
                continue;
            }

            // Edge midpoints of this cell in doubled (col, row) coordinates
            let top = (2 * col + 1, 2 * row);
            let bottom = (2 * col + 1, 2 * row + 2);
            let left = (2 * col, 2 * row + 1);
            let right = (2 * col + 2, 2 * row + 1);

            match case {
                1 => emit(bottom, left),
                2 => emit(right, bottom),
                3 => emit(right, left),
                4 => emit(top, right),
                6 => emit(top, bottom),
                7 => emit(top, left),
                8 => emit(left, top),
                9 => emit(bottom, top),
                11 => emit(right, top),
                12 => emit(left, right),
                13 => emit(bottom, right),
                14 => emit(left, bottom),
                // Saddles: connect the diagonal foreground
                5 => {
                    emit(top, left);
                    emit(bottom, right);
                }
                10 => {
                    emit(right, top);
                    emit(left, bottom);
                }
                _ => unreachable!(),
            }
        }
    }

    let mut rings = Vec::new();
    let mut visited: HashSet<Key> = HashSet::new();

    for &start in &starts {
        if visited.contains(&start) {
            continue;
        }

        let mut ring = Vec::new();
        let mut current = start;
        loop {
            visited.insert(current);
            ring.push((current.0 as f64 / 2.0, current.1 as f64 / 2.0));
            match next.get(&current) {
                Some(&n) if n != start => current = n,
                _ => break,
            }
        }
        // Close the ring explicitly
        ring.push(ring[0]);
        rings.push(ring);
    }

    rings
}

/// Shoelace signed area of a closed ring of (col, row) coordinates.
///
/// With row increasing downward, rings around foreground come out negative
/// and rings around holes positive.
pub fn ring_signed_area(ring: &[(f64, f64)]) -> f64 {
    let mut sum = 0.0;
    for pair in ring.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        sum += x0 * y1 - x1 * y0;
    }
    sum / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: usize, cols: usize, ones: &[(usize, usize)]) -> Raster<u8> {
        let mut mask = Raster::new(rows, cols);
        for &(r, c) in ones {
            mask.set(r, c, 1).unwrap();
        }
        mask
    }

    #[test]
    fn test_empty_mask_no_rings() {
        let mask: Raster<u8> = Raster::new(5, 5);
        assert!(trace_rings(&mask).is_empty());
    }

    #[test]
    fn test_single_pixel_diamond() {
        let mask = mask_from(3, 3, &[(1, 1)]);
        let rings = trace_rings(&mask);

        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert_eq!(ring.len(), 5); // 4 vertices + closing point
        assert_eq!(ring[0], *ring.last().unwrap());

        let area = ring_signed_area(ring);
        assert!((area - (-0.5)).abs() < 1e-12, "got area {}", area);
    }

    #[test]
    fn test_square_block_area() {
        // 3x3 block: 9 pixels, traced outline trims an eighth of a pixel
        // at each of the four corners
        let ones: Vec<(usize, usize)> = (1..4).flat_map(|r| (1..4).map(move |c| (r, c))).collect();
        let mask = mask_from(5, 5, &ones);
        let rings = trace_rings(&mask);

        assert_eq!(rings.len(), 1);
        let area = ring_signed_area(&rings[0]);
        assert!((area - (-8.5)).abs() < 1e-12, "got area {}", area);
    }

    #[test]
    fn test_hole_produces_opposite_ring() {
        // 5x5 block with the center pixel removed: one exterior ring and
        // one hole ring of opposite sign
        let ones: Vec<(usize, usize)> = (1..6)
            .flat_map(|r| (1..6).map(move |c| (r, c)))
            .filter(|&p| p != (3, 3))
            .collect();
        let mask = mask_from(7, 7, &ones);
        let rings = trace_rings(&mask);

        assert_eq!(rings.len(), 2);
        let areas: Vec<f64> = rings.iter().map(|r| ring_signed_area(r)).collect();
        assert_eq!(areas.iter().filter(|&&a| a < 0.0).count(), 1);
        assert_eq!(areas.iter().filter(|&&a| a > 0.0).count(), 1);
        // The hole ring is a single-pixel diamond
        let hole = areas.iter().find(|&&a| a > 0.0).unwrap();
        assert!((hole - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_pixels_single_ring() {
        // 8-connectivity: a diagonal pair traces as one connected boundary
        let mask = mask_from(4, 4, &[(1, 1), (2, 2)]);
        let rings = trace_rings(&mask);

        let exteriors = rings
            .iter()
            .filter(|r| ring_signed_area(r) < 0.0)
            .count();
        assert_eq!(exteriors, 1, "diagonal pixels should share one outline");
    }

    #[test]
    fn test_two_separate_blobs() {
        let mask = mask_from(6, 6, &[(1, 1), (4, 4)]);
        let rings = trace_rings(&mask);
        assert_eq!(rings.len(), 2);
        // Row-major discovery: the (1,1) diamond comes first
        assert!(rings[0].iter().all(|&(_, row)| row < 2.0));
    }

    #[test]
    fn test_edge_touching_pixel_closes() {
        // Padding closes rings around pixels on the raster border
        let mask = mask_from(3, 3, &[(0, 0)]);
        let rings = trace_rings(&mask);

        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0][0], *rings[0].last().unwrap());
        assert!((ring_signed_area(&rings[0]) - (-0.5)).abs() < 1e-12);
    }
}
