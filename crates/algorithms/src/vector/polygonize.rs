//! Polygon assembly from traced boundary rings
//!
//! Rings from the tracer are classified by pixel-space orientation into
//! shells and holes, mapped to world coordinates through the raster
//! geotransform, assembled into polygons with normalized winding (shells
//! counter-clockwise, holes clockwise), and filtered by a minimum area.

use geo::{Area, Contains, LineString, Point, Polygon, Winding};
use tracing::{debug, warn};

use shoreline_core::raster::Raster;
use shoreline_core::Result;

use super::trace::{ring_signed_area, trace_rings};

/// Default minimum polygon area, in squared world units
pub const DEFAULT_MIN_AREA: f64 = 500.0;

/// Parameters for raster-to-polygon conversion
#[derive(Debug, Clone)]
pub struct VectorizeParams {
    /// Polygons with unsigned area below this are discarded as noise
    pub min_area: f64,
}

impl Default for VectorizeParams {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
        }
    }
}

/// Convert a binary mask into world-coordinate polygons.
///
/// Returns the kept polygons in boundary discovery order together with the
/// number of rings dropped because they could not be assembled (degenerate
/// rings, or interior rings with no enclosing shell). Polygons removed by
/// the area floor are not counted as dropped.
pub fn vectorize_mask(
    mask: &Raster<u8>,
    params: &VectorizeParams,
) -> Result<(Vec<Polygon<f64>>, usize)> {
    let transform = *mask.transform();
    let mut dropped = 0usize;

    let mut shells: Vec<LineString<f64>> = Vec::new();
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in trace_rings(mask) {
        let signed = ring_signed_area(&ring);
        // A valid closed ring has at least three distinct vertices
        if ring.len() < 4 || signed == 0.0 {
            warn!(vertices = ring.len(), "dropping degenerate boundary ring");
            dropped += 1;
            continue;
        }

        let world: Vec<(f64, f64)> = ring
            .iter()
            .map(|&(col, row)| transform.fractional_pixel_to_geo(col, row))
            .collect();
        let line = LineString::from(world);

        // In pixel space (row down) shells trace negative, holes positive
        if signed < 0.0 {
            shells.push(line);
        } else {
            holes.push(line);
        }
    }

    // Assign each hole to the smallest shell containing it. Rings never
    // share vertices, so any vertex of the hole works as a probe point.
    let shell_polygons: Vec<Polygon<f64>> = shells
        .iter()
        .map(|s| Polygon::new(s.clone(), Vec::new()))
        .collect();
    let mut shell_holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];

    for hole in holes {
        let probe = Point::from(hole.0[0]);
        let mut best: Option<(usize, f64)> = None;
        for (i, shell) in shell_polygons.iter().enumerate() {
            if shell.contains(&probe) {
                let area = shell.unsigned_area();
                if best.map_or(true, |(_, a)| area < a) {
                    best = Some((i, area));
                }
            }
        }
        match best {
            Some((i, _)) => shell_holes[i].push(hole),
            None => {
                warn!("dropping interior ring with no enclosing polygon");
                dropped += 1;
            }
        }
    }

    let mut polygons = Vec::new();
    let mut filtered = 0usize;
    for (mut shell, mut rings) in shells.into_iter().zip(shell_holes) {
        shell.make_ccw_winding();
        for ring in &mut rings {
            ring.make_cw_winding();
        }

        let polygon = Polygon::new(shell, rings);
        if polygon.unsigned_area() < params.min_area {
            filtered += 1;
            continue;
        }
        polygons.push(polygon);
    }

    if filtered > 0 {
        debug!(
            filtered,
            min_area = params.min_area,
            "removed polygons below the area floor"
        );
    }

    Ok((polygons, dropped))
}
