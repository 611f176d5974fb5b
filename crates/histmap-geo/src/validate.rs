//! # Structural Validation of Territory Collections
//!
//! [`GeoValidator::validate`] walks a year's features once, in order, and
//! classifies every finding into exactly one bucket of a
//! [`ValidationResult`]:
//!
//! | Bucket  | Categories |
//! |---------|------------|
//! | error   | `EMPTY_COLLECTION`, `INVALID_COLLECTION`, `MISSING_NAME`, `MISSING_GEOMETRY`, `MALFORMED_GEOMETRY`, `INVALID_POSITION`, `TOO_FEW_POINTS`, `OUT_OF_BOUNDS`, `DUPLICATE_ID` |
//! | repair  | `DUPLICATE_VERTEX`, `UNCLOSED_RING`, `WINDING_ORDER` |
//! | warning | `TINY_AREA`, `UNKNOWN_TERRITORY`, `SELF_INTERSECTION`, `UNSUPPORTED_GEOMETRY` |
//!
//! ## Repairs
//!
//! Repairs are applied to a clone of the input, returned in
//! [`GeoValidation::collection`]. Per ring, in order: consecutive duplicate
//! vertices are collapsed, an open ring is closed by appending its first
//! position, and orientation is corrected to the RFC 7946 right-hand rule
//! (exterior counter-clockwise, holes clockwise). A ring that is fatally
//! defective is left exactly as read and contributes no repairs.
//!
//! ## Duplicate Identifiers
//!
//! Identifiers are buffered across the whole pass; `DUPLICATE_ID` errors are
//! emitted after every feature has been seen, one per repeated occurrence.
//! An explicit id and a name used as a fallback identifier never collide
//! with each other, only with their own kind.

use std::collections::{BTreeSet, HashMap};

use histmap_core::{IssueType, ValidationIssue, ValidationResult, Year};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Feature, FeatureCollection, Geometry, Ring};
use crate::ring;

/// Tunable thresholds and property conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Property keys searched, in order, for the territory name.
    pub name_keys: Vec<String>,
    /// Property keys searched for an explicit identifier when the feature
    /// has no top-level `id`.
    pub id_keys: Vec<String>,
    /// Features with less area than this (square degrees) get `TINY_AREA`.
    pub min_area: f64,
    /// The year's territory metadata. When set, names not listed here get
    /// `UNKNOWN_TERRITORY`.
    pub known_territories: Option<BTreeSet<String>>,
    /// Rings with more vertices than this skip the self-intersection scan.
    pub max_intersection_vertices: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            name_keys: vec!["NAME".into(), "name".into()],
            id_keys: vec!["id".into(), "ID".into()],
            min_area: 1e-6,
            known_territories: None,
            max_intersection_vertices: 4096,
        }
    }
}

/// Validation verdict plus the repaired collection.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoValidation {
    pub result: ValidationResult,
    /// The input with every recorded repair applied.
    pub collection: FeatureCollection,
}

/// Classifies defects in a year's territory collection.
#[derive(Debug, Clone, Default)]
pub struct GeoValidator {
    config: ValidatorConfig,
}

/// Locator prefix for a feature's issues: `feature 3 (Rome)`.
struct FeatureLabel(String);

impl FeatureLabel {
    fn new(index: usize, name: Option<&str>) -> Self {
        match name {
            Some(n) => Self(format!("feature {index} ({n})")),
            None => Self(format!("feature {index} (unnamed)")),
        }
    }
}

impl GeoValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Same validator, with the year's territory metadata attached.
    pub fn with_known_territories<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = self.config.clone();
        config.known_territories = Some(names.into_iter().map(Into::into).collect());
        Self { config }
    }

    /// Validate `input` for `year`. `input` is not modified.
    pub fn validate(&self, year: Year, input: &FeatureCollection) -> GeoValidation {
        let mut collection = input.clone();
        let mut result = ValidationResult::new(year);

        if collection.kind != "FeatureCollection" {
            result.record(ValidationIssue::new(
                IssueType::InvalidCollection,
                format!("top-level type is {:?}, expected \"FeatureCollection\"", collection.kind),
            ));
        }

        let features = collection.features.as_deref_mut().unwrap_or_default();
        if features.is_empty() {
            let details = if input.features.is_none() {
                "collection has no \"features\" member"
            } else {
                "collection has zero features"
            };
            result.record(ValidationIssue::new(IssueType::EmptyCollection, details));
        }

        let mut identifiers: Vec<(usize, IdKey, String)> = Vec::with_capacity(features.len());
        for (index, feature) in features.iter_mut().enumerate() {
            let name = feature.property_str(&self.config.name_keys).map(str::to_string);
            let label = FeatureLabel::new(index, name.as_deref());

            match name.as_deref() {
                None => result.record(ValidationIssue::new(
                    IssueType::MissingName,
                    format!(
                        "{}: no non-empty string under properties {:?}",
                        label.0, self.config.name_keys
                    ),
                )),
                Some(n) => {
                    if let Some(known) = &self.config.known_territories {
                        if !known.contains(n) {
                            result.record(ValidationIssue::new(
                                IssueType::UnknownTerritory,
                                format!(
                                    "{}: territory not listed in year {year} metadata ({} known)",
                                    label.0,
                                    known.len()
                                ),
                            ));
                        }
                    }
                }
            }

            let key = match feature.identifier(&self.config.id_keys) {
                Some(id) => Some(IdKey::Explicit(id)),
                None => name.clone().map(IdKey::Name),
            };
            if let Some(key) = key {
                identifiers.push((index, key, label.0.clone()));
            }

            self.check_geometry(feature, &label, &mut result);
        }

        let feature_count = features.len();
        for issue in duplicate_identifiers(&identifiers) {
            result.record(issue);
        }
        result.feature_count = feature_count;

        tracing::debug!(
            year = %year,
            features = result.feature_count,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            repairs = result.repairs.len(),
            "validated feature collection"
        );

        GeoValidation { result, collection }
    }

    fn check_geometry(&self, feature: &mut Feature, label: &FeatureLabel, result: &mut ValidationResult) {
        let geometry = match feature.geometry.as_mut() {
            None => {
                result.record(ValidationIssue::new(
                    IssueType::MissingGeometry,
                    format!("{}: geometry is null or absent", label.0),
                ));
                return;
            }
            Some(Geometry::Other(raw)) => {
                classify_other_geometry(raw, label, result);
                return;
            }
            Some(Geometry::Polygonal(p)) => p,
        };

        let type_name = geometry.type_name();
        let polygons = geometry.polygons_mut();
        if polygons.is_empty() {
            result.record(ValidationIssue::new(
                IssueType::TooFewPoints,
                format!("{}: {type_name} has no polygons", label.0),
            ));
            return;
        }

        let mut fatal = false;
        let mut area = 0.0;
        for (p_index, rings) in polygons.into_iter().enumerate() {
            if rings.is_empty() {
                result.record(ValidationIssue::new(
                    IssueType::TooFewPoints,
                    format!("{}: polygon {p_index} has no rings", label.0),
                ));
                fatal = true;
                continue;
            }
            for (r_index, ring) in rings.iter_mut().enumerate() {
                let location = RingLocation {
                    label,
                    polygon: p_index,
                    ring: r_index,
                };
                fatal |= !self.check_ring(ring, &location, result);
            }
            area += ring::polygon_area(rings.as_slice());
        }

        if !fatal && area < self.config.min_area {
            result.record(ValidationIssue::new(
                IssueType::TinyArea,
                format!(
                    "{}: area {area:e} sq deg is below threshold {:e}",
                    label.0, self.config.min_area
                ),
            ));
        }
    }

    /// Check and repair one ring. Returns `false` when the ring is fatally
    /// defective, in which case it is left untouched.
    fn check_ring(&self, ring: &mut Ring, at: &RingLocation<'_>, result: &mut ValidationResult) -> bool {
        if let Some(bad) = ring.iter().position(|p| p.len() < 2) {
            result.record(ValidationIssue::new(
                IssueType::InvalidPosition,
                format!(
                    "{at}: position {bad} has {} coordinate(s), need at least 2",
                    ring[bad].len()
                ),
            ));
            return false;
        }

        let out_of_bounds: Vec<usize> = ring
            .iter()
            .enumerate()
            .filter(|(_, p)| !in_bounds(p[0], p[1]))
            .map(|(i, _)| i)
            .collect();
        if let Some(&first) = out_of_bounds.first() {
            result.record(ValidationIssue::new(
                IssueType::OutOfBounds,
                format!(
                    "{at}: {} position(s) outside lon [-180, 180] / lat [-90, 90], first at index {first}: {}",
                    out_of_bounds.len(),
                    ring::fmt_position(&ring[first])
                ),
            ));
            return false;
        }

        let mut work = ring.clone();
        let collapsed = ring::collapse_consecutive_duplicates(&mut work);
        let distinct = ring::distinct_vertex_count(&work);
        if distinct < 3 {
            result.record(ValidationIssue::new(
                IssueType::TooFewPoints,
                format!(
                    "{at}: {distinct} distinct vertices (of {} positions), need at least 3",
                    ring.len()
                ),
            ));
            return false;
        }

        let mut repairs = Vec::new();
        if collapsed > 0 {
            repairs.push(ValidationIssue::new(
                IssueType::DuplicateVertex,
                format!("{at}: collapsed {collapsed} consecutive duplicate vertices"),
            ));
        }

        if !ring::is_closed(&work) {
            let first = work[0].clone();
            let last = work[work.len() - 1].clone();
            work.push(first.clone());
            repairs.push(ValidationIssue::new(
                IssueType::UnclosedRing,
                format!(
                    "{at}: first point {} differs from last point {}; appended first point",
                    ring::fmt_position(&first),
                    ring::fmt_position(&last)
                ),
            ));
        }

        let area = ring::signed_area(&work);
        let exterior = at.ring == 0;
        if (exterior && area < 0.0) || (!exterior && area > 0.0) {
            work.reverse();
            repairs.push(ValidationIssue::new(
                IssueType::WindingOrder,
                format!(
                    "{at}: {} ring was {} (signed area {area:e}); reversed",
                    if exterior { "exterior" } else { "interior" },
                    if area < 0.0 { "clockwise" } else { "counter-clockwise" }
                ),
            ));
        }

        let vertices = work.len() - 1;
        if vertices <= self.config.max_intersection_vertices {
            if let Some(hit) = ring::find_self_intersection(&work) {
                result.record(ValidationIssue::new(
                    IssueType::SelfIntersection,
                    format!(
                        "{at}: edge {} ({} -> {}) meets edge {} ({} -> {})",
                        hit.first_edge,
                        ring::fmt_position(&work[hit.first_edge]),
                        ring::fmt_position(&work[hit.first_edge + 1]),
                        hit.second_edge,
                        ring::fmt_position(&work[hit.second_edge]),
                        ring::fmt_position(&work[hit.second_edge + 1]),
                    ),
                ));
            }
        }

        for issue in repairs {
            result.record(issue);
        }
        *ring = work;
        true
    }
}

struct RingLocation<'a> {
    label: &'a FeatureLabel,
    polygon: usize,
    ring: usize,
}

impl std::fmt::Display for RingLocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: polygon {} ring {}", self.label.0, self.polygon, self.ring)
    }
}

fn in_bounds(lon: f64, lat: f64) -> bool {
    lon.is_finite() && lat.is_finite() && (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)
}

fn classify_other_geometry(raw: &Value, label: &FeatureLabel, result: &mut ValidationResult) {
    match raw.get("type").and_then(Value::as_str) {
        Some(t @ ("Polygon" | "MultiPolygon")) => result.record(ValidationIssue::new(
            IssueType::MalformedGeometry,
            format!("{}: {t} coordinates do not have the expected nesting", label.0),
        )),
        Some(
            t @ ("Point" | "MultiPoint" | "LineString" | "MultiLineString" | "GeometryCollection"),
        ) => result.record(ValidationIssue::new(
            IssueType::UnsupportedGeometry,
            format!("{}: {t} geometry is not a territory boundary; carried through unchanged", label.0),
        )),
        Some(t) => result.record(ValidationIssue::new(
            IssueType::MalformedGeometry,
            format!("{}: unknown geometry type {t:?}", label.0),
        )),
        None => result.record(ValidationIssue::new(
            IssueType::MalformedGeometry,
            format!("{}: geometry has no \"type\" member", label.0),
        )),
    }
}

/// Where a feature's identifier came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IdKey {
    /// Top-level `id` or one of the configured id properties.
    Explicit(String),
    /// The territory name, for features without an explicit id.
    Name(String),
}

impl std::fmt::Display for IdKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(id) => write!(f, "identifier {id:?}"),
            Self::Name(name) => write!(f, "name {name:?}"),
        }
    }
}

/// `DUPLICATE_ID` for every occurrence of an identifier after its first.
fn duplicate_identifiers(identifiers: &[(usize, IdKey, String)]) -> Vec<ValidationIssue> {
    let mut first_seen: HashMap<&IdKey, usize> = HashMap::with_capacity(identifiers.len());
    let mut issues = Vec::new();
    for (index, key, label) in identifiers {
        match first_seen.get(key) {
            Some(first) => issues.push(ValidationIssue::new(
                IssueType::DuplicateId,
                format!("{label}: {key} already used by feature {first}"),
            )),
            None => {
                first_seen.insert(key, *index);
            }
        }
    }
    issues
}
