//! # GeoScope Core
//!
//! Feature data model and the validating parser that turns untrusted,
//! GeoJSON-shaped documents into well-formed feature layers.
//!
//! Everything here is pure and synchronous: documents come in as
//! [`serde_json::Value`], layers go out as typed collections the rest of
//! the viewer can marshal without re-checking shape.

pub mod feature;
pub mod parse;

pub use feature::{Feature, FeatureLayer, Polygon, PolygonSet, Position, Ring};
pub use parse::{parse_features, ParseError, ParseOutcome};
