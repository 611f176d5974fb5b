//! # GeoJSON Model
//!
//! Serde types for the parts of RFC 7946 the pipeline inspects. Members the
//! pipeline does not understand, at collection, feature and polygonal
//! geometry level, are preserved in `foreign` maps so that a repaired
//! collection writes back everything it read.
//!
//! Polygonal geometry is parsed into typed coordinates. Anything else,
//! including a `Polygon` whose coordinates have the wrong nesting, is kept
//! as raw JSON in [`Geometry::Other`] for the validator to classify.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `[longitude, latitude, ...]`.
pub type Position = Vec<f64>;

/// A linear ring. Valid rings are closed (first == last) with at least
/// four positions.
pub type Ring = Vec<Position>;

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

/// A year's merged territory boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
    #[serde(flatten)]
    pub foreign: Map<String, Value>,
}

impl FeatureCollection {
    /// A collection holding `features`.
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: feature_collection_type(),
            features: Some(features),
            foreign: Map::new(),
        }
    }

    /// Parse a GeoJSON document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Features, or an empty slice when the member is absent.
    pub fn features(&self) -> &[Feature] {
        self.features.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.features().len()
    }

    pub fn is_empty(&self) -> bool {
        self.features().is_empty()
    }
}

/// One territory boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(flatten)]
    pub foreign: Map<String, Value>,
}

impl Feature {
    /// A feature with the given properties and geometry.
    pub fn new(properties: Map<String, Value>, geometry: Option<Geometry>) -> Self {
        Self {
            kind: feature_type(),
            id: None,
            properties: Some(properties),
            geometry,
            foreign: Map::new(),
        }
    }

    /// First non-blank string property among `keys`.
    pub fn property_str<'a>(&'a self, keys: &[String]) -> Option<&'a str> {
        let props = self.properties.as_ref()?;
        keys.iter()
            .filter_map(|k| props.get(k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    /// First non-blank string or numeric identifier: the top-level `id`,
    /// then any of `keys` in `properties`.
    pub fn identifier(&self, keys: &[String]) -> Option<String> {
        if let Some(id) = self.id.as_ref().and_then(scalar_id) {
            return Some(id);
        }
        let props = self.properties.as_ref()?;
        keys.iter().filter_map(|k| props.get(k)).find_map(scalar_id)
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Geometry of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    /// `Polygon` or `MultiPolygon` with well-formed coordinate nesting.
    Polygonal(Polygonal),
    /// Anything else, kept verbatim.
    Other(Value),
}

/// Typed polygonal geometry. Geometry-level members such as `bbox` are
/// kept in `foreign`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Polygonal {
    Polygon {
        coordinates: Vec<Ring>,
        #[serde(flatten)]
        foreign: Map<String, Value>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
        #[serde(flatten)]
        foreign: Map<String, Value>,
    },
}

impl Polygonal {
    pub fn polygon(coordinates: Vec<Ring>) -> Self {
        Self::Polygon {
            coordinates,
            foreign: Map::new(),
        }
    }

    pub fn multi_polygon(coordinates: Vec<Vec<Ring>>) -> Self {
        Self::MultiPolygon {
            coordinates,
            foreign: Map::new(),
        }
    }

    /// Each polygon as its list of rings (exterior first).
    pub fn polygons(&self) -> Vec<&Vec<Ring>> {
        match self {
            Self::Polygon { coordinates, .. } => vec![coordinates],
            Self::MultiPolygon { coordinates, .. } => coordinates.iter().collect(),
        }
    }

    /// Mutable access to each polygon's rings.
    pub fn polygons_mut(&mut self) -> Vec<&mut Vec<Ring>> {
        match self {
            Self::Polygon { coordinates, .. } => vec![coordinates],
            Self::MultiPolygon { coordinates, .. } => coordinates.iter_mut().collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Polygon { .. } => "Polygon",
            Self::MultiPolygon { .. } => "MultiPolygon",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_polygon_and_preserves_foreign_members() {
        let doc = json!({
            "type": "FeatureCollection",
            "name": "world_1500",
            "features": [{
                "type": "Feature",
                "properties": {"NAME": "Venice"},
                "geometry": {"type": "Polygon", "coordinates": [[[12,45],[13,45],[13,46],[12,45]]]},
                "bbox": [12, 45, 13, 46]
            }]
        });
        let fc: FeatureCollection = serde_json::from_value(doc).unwrap();
        assert_eq!(fc.foreign["name"], "world_1500");
        let f = &fc.features()[0];
        assert!(f.foreign.contains_key("bbox"));
        match f.geometry.as_ref().unwrap() {
            Geometry::Polygonal(Polygonal::Polygon { coordinates, .. }) => {
                assert_eq!(coordinates[0].len(), 4);
                assert_eq!(coordinates[0][1], vec![13.0, 45.0]);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
        let back = serde_json::to_value(&fc).unwrap();
        assert_eq!(back["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(back["name"], "world_1500");
    }

    #[test]
    fn geometry_members_survive_a_round_trip() {
        let geometry = json!({
            "type": "MultiPolygon",
            "bbox": [0, 0, 1, 1],
            "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]
        });
        let parsed: Geometry = serde_json::from_value(geometry.clone()).unwrap();
        let Geometry::Polygonal(Polygonal::MultiPolygon { foreign, .. }) = &parsed else {
            panic!("expected multipolygon, got {parsed:?}");
        };
        assert_eq!(foreign["bbox"], json!([0, 0, 1, 1]));
        assert!(!foreign.contains_key("type"));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), geometry);
    }

    #[test]
    fn malformed_polygon_falls_back_to_other() {
        let f: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "Polygon", "coordinates": [[1, 2, 3]]}
        }))
        .unwrap();
        assert!(matches!(f.geometry, Some(Geometry::Other(_))));
    }

    #[test]
    fn null_geometry_and_properties() {
        let f: Feature = serde_json::from_value(json!({
            "type": "Feature", "properties": null, "geometry": null
        }))
        .unwrap();
        assert!(f.geometry.is_none());
        assert!(f.properties.is_none());
    }

    #[test]
    fn identifier_prefers_top_level_id() {
        let keys = vec!["id".to_string(), "ID".to_string()];
        let mut f: Feature = serde_json::from_value(json!({
            "type": "Feature", "id": 7, "properties": {"ID": "x"}, "geometry": null
        }))
        .unwrap();
        assert_eq!(f.identifier(&keys).as_deref(), Some("7"));
        f.id = None;
        assert_eq!(f.identifier(&keys).as_deref(), Some("x"));
    }

    #[test]
    fn property_str_skips_blank_values() {
        let keys = vec!["NAME".to_string(), "name".to_string()];
        let f: Feature = serde_json::from_value(json!({
            "type": "Feature", "properties": {"NAME": "  ", "name": "Aztec Empire"}, "geometry": null
        }))
        .unwrap();
        assert_eq!(f.property_str(&keys), Some("Aztec Empire"));
    }

    #[test]
    fn missing_features_member() {
        let fc: FeatureCollection =
            serde_json::from_value(json!({"type": "FeatureCollection"})).unwrap();
        assert!(fc.features.is_none());
        assert!(fc.is_empty());
    }
}
