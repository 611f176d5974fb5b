//! # histmap-geo — GeoJSON Structural Validation
//!
//! Inspects one year's merged territory collection and decides, per finding,
//! whether it is fatal, tolerable, or fixable:
//!
//! - **Errors** block publication (missing names, degenerate rings,
//!   coordinates off the globe, duplicate territory identifiers).
//! - **Repairs** are applied to a copy of the collection and recorded
//!   (unclosed rings, wrong winding order, repeated vertices).
//! - **Warnings** are logged and publication proceeds (tiny polygons,
//!   territories unknown to the year's metadata, self-intersections).
//!
//! ## Modules
//!
//! - [`model`]: serde types for the subset of GeoJSON the pipeline reads.
//! - [`ring`]: planar ring arithmetic (area, orientation, intersection).
//! - [`validate`]: [`GeoValidator`] and its configuration.
//!
//! ## Crate Policy
//!
//! - Depends only on `histmap-core` internally.
//! - The input collection is never mutated; repairs land in the returned copy.

pub mod model;
pub mod ring;
pub mod validate;

pub use model::{Feature, FeatureCollection, Geometry, Polygonal, Position, Ring};
pub use validate::{GeoValidation, GeoValidator, ValidatorConfig};
