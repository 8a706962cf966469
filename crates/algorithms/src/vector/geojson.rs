//! GeoJSON feature-collection export
//!
//! Serialization mirrors the layout downstream GIS tooling expects: a
//! `FeatureCollection` with a named CRS member and one feature per polygon,
//! each carrying a sequential integer `id` property.

use geo::Polygon;
use serde::{Deserialize, Serialize};

/// A GeoJSON feature collection with a named CRS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub crs: Crs,
    pub features: Vec<Feature>,
}

/// Named CRS member: `{"type": "name", "properties": {"name": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crs {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: CrsProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrsProperties {
    pub name: String,
}

/// A single polygon feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub id: u64,
}

/// Polygon geometry: one exterior ring followed by any interior rings,
/// each ring closed (first position repeated last)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl FeatureCollection {
    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Serialize to a compact JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to an indented JSON string
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a feature collection from JSON text
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Build a feature collection from polygons.
///
/// Features carry sequential ids starting at 0, in the order the polygons
/// are given. An empty polygon list yields a collection with an empty
/// `features` array, still a valid document.
pub fn feature_collection(polygons: &[Polygon<f64>], crs_name: &str) -> FeatureCollection {
    let features = polygons
        .iter()
        .enumerate()
        .map(|(id, polygon)| Feature {
            kind: "Feature".to_string(),
            properties: FeatureProperties { id: id as u64 },
            geometry: polygon_geometry(polygon),
        })
        .collect();

    FeatureCollection {
        kind: "FeatureCollection".to_string(),
        crs: Crs {
            kind: "name".to_string(),
            properties: CrsProperties {
                name: crs_name.to_string(),
            },
        },
        features,
    }
}

fn polygon_geometry(polygon: &Polygon<f64>) -> Geometry {
    let ring_coords = |ring: &geo::LineString<f64>| -> Vec<[f64; 2]> {
        ring.coords().map(|c| [c.x, c.y]).collect()
    };

    let mut coordinates = Vec::with_capacity(1 + polygon.interiors().len());
    coordinates.push(ring_coords(polygon.exterior()));
    for interior in polygon.interiors() {
        coordinates.push(ring_coords(interior));
    }

    Geometry {
        kind: "Polygon".to_string(),
        coordinates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn unit_square(offset: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (offset, 0.0),
                (offset + 1.0, 0.0),
                (offset + 1.0, 1.0),
                (offset, 1.0),
                (offset, 0.0),
            ]),
            Vec::new(),
        )
    }

    #[test]
    fn test_empty_collection_valid() {
        let fc = feature_collection(&[], "EPSG:32719");
        assert!(fc.is_empty());

        let json = fc.to_json().unwrap();
        assert!(json.contains("\"type\":\"FeatureCollection\""));
        assert!(json.contains("\"features\":[]"));
        assert!(json.contains("EPSG:32719"));
    }

    #[test]
    fn test_sequential_ids() {
        let polygons = vec![unit_square(0.0), unit_square(5.0), unit_square(10.0)];
        let fc = feature_collection(&polygons, "EPSG:4326");

        let ids: Vec<u64> = fc.features.iter().map(|f| f.properties.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_rings_closed() {
        let fc = feature_collection(&[unit_square(0.0)], "EPSG:4326");
        let ring = &fc.features[0].geometry.coordinates[0];
        assert_eq!(ring.first(), ring.last());
        assert!(ring.len() >= 4);
    }

    #[test]
    fn test_json_roundtrip() {
        let fc = feature_collection(&[unit_square(0.0)], "EPSG:32719");
        let json = fc.to_json().unwrap();
        let parsed = FeatureCollection::from_json(&json).unwrap();

        assert_eq!(parsed.kind, "FeatureCollection");
        assert_eq!(parsed.crs.properties.name, "EPSG:32719");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.features[0].geometry.kind, "Polygon");
        assert_eq!(
            parsed.features[0].geometry.coordinates,
            fc.features[0].geometry.coordinates
        );
    }

    #[test]
    fn test_hole_as_second_ring() {
        let shell = LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let hole = LineString::from(vec![
            (4.0, 4.0),
            (4.0, 6.0),
            (6.0, 6.0),
            (6.0, 4.0),
            (4.0, 4.0),
        ]);
        let polygon = Polygon::new(shell, vec![hole]);

        let fc = feature_collection(&[polygon], "EPSG:4326");
        assert_eq!(fc.features[0].geometry.coordinates.len(), 2);
    }
}
