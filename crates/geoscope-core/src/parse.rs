//! Validating parser for raw feature-collection documents.
//!
//! Documents arrive as arbitrary JSON fetched from the network. Structural
//! problems with the document itself (wrong collection tag, no feature
//! array) abort the parse with a [`ParseError`]; a malformed individual
//! entry is dropped and the parse continues. A document where every entry
//! was dropped is a valid "nothing to render", not an error.

use serde_json::Value;
use thiserror::Error;

use crate::feature::{Feature, PolygonSet};

/// Collection tag a usable document must carry.
const COLLECTION_TAG: &str = "FeatureCollection";

/// Geometry tag a usable entry must carry.
const GEOMETRY_TAG: &str = "MultiPolygon";

/// Result of validating a raw document: either a non-empty ordered feature
/// list or a well-typed "no usable features".
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Layer(Vec<Feature>),
    Empty,
}

/// Hard validation failure: the document as a whole is not a usable
/// feature collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to parse feature layer: missing `type`")]
    MissingType,
    #[error("failed to parse feature layer: `type` is not `FeatureCollection`")]
    NotFeatureCollection,
    #[error("failed to parse feature layer: missing `features` array")]
    MissingFeatures,
}

/// Validate a raw JSON document into an ordered feature list.
///
/// Entries are restructured to `{ name, coordinates }` and kept in source
/// order. Zero surviving entries yields [`ParseOutcome::Empty`].
pub fn parse_features(doc: &Value) -> Result<ParseOutcome, ParseError> {
    let tag = doc.get("type").ok_or(ParseError::MissingType)?;
    if tag != COLLECTION_TAG {
        return Err(ParseError::NotFeatureCollection);
    }
    let entries = doc
        .get("features")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingFeatures)?;

    let mut features = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match validate_entry(entry) {
            Some(feature) => features.push(feature),
            None => log::debug!("dropping malformed feature entry {index}"),
        }
    }

    if features.is_empty() {
        Ok(ParseOutcome::Empty)
    } else {
        Ok(ParseOutcome::Layer(features))
    }
}

/// Check one entry against every per-feature rule.
///
/// An entry must carry `properties` with a non-null string `NAME`, and a
/// `geometry` tagged `MultiPolygon` with a non-empty, well-nested
/// coordinate set. Anything else is a skip, never an error.
fn validate_entry(entry: &Value) -> Option<Feature> {
    let properties = entry.get("properties")?;
    let name = properties.get("NAME")?.as_str()?;

    let geometry = entry.get("geometry")?;
    if geometry.get("type")? != GEOMETRY_TAG {
        return None;
    }
    let coordinates = geometry.get("coordinates")?;
    let coordinates: PolygonSet = serde_json::from_value(coordinates.clone()).ok()?;
    if coordinates.is_empty() {
        return None;
    }

    Some(Feature {
        name: name.to_string(),
        coordinates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn multi_polygon() -> Value {
        json!({
            "type": "MultiPolygon",
            "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]],
        })
    }

    fn entry(name: Value, geometry: Value) -> Value {
        json!({ "properties": { "NAME": name }, "geometry": geometry })
    }

    #[test]
    fn test_valid_document_restructures_entries() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [entry(json!("A"), multi_polygon())],
        });
        let outcome = parse_features(&doc).unwrap();
        let ParseOutcome::Layer(features) = outcome else {
            panic!("expected a layer");
        };
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "A");
        assert_eq!(
            features[0].coordinates,
            vec![vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]],
        );
    }

    #[test]
    fn test_missing_type_is_hard_error() {
        let doc = json!({ "features": [entry(json!("A"), multi_polygon())] });
        assert_eq!(parse_features(&doc), Err(ParseError::MissingType));
    }

    #[test]
    fn test_wrong_collection_tag_is_hard_error() {
        let doc = json!({ "type": "Feature", "features": [] });
        assert_eq!(parse_features(&doc), Err(ParseError::NotFeatureCollection));
    }

    #[test]
    fn test_missing_features_is_hard_error() {
        let doc = json!({ "type": "FeatureCollection" });
        assert_eq!(parse_features(&doc), Err(ParseError::MissingFeatures));
    }

    #[test]
    fn test_null_name_is_skipped() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [entry(Value::Null, multi_polygon())],
        });
        assert_eq!(parse_features(&doc), Ok(ParseOutcome::Empty));
    }

    #[test]
    fn test_non_string_name_is_skipped() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [entry(json!(7), multi_polygon())],
        });
        assert_eq!(parse_features(&doc), Ok(ParseOutcome::Empty));
    }

    #[test]
    fn test_wrong_geometry_tag_is_skipped() {
        let geometry = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
        });
        let doc = json!({
            "type": "FeatureCollection",
            "features": [entry(json!("A"), geometry)],
        });
        assert_eq!(parse_features(&doc), Ok(ParseOutcome::Empty));
    }

    #[test]
    fn test_empty_coordinates_are_skipped() {
        let geometry = json!({ "type": "MultiPolygon", "coordinates": [] });
        let doc = json!({
            "type": "FeatureCollection",
            "features": [entry(json!("A"), geometry)],
        });
        assert_eq!(parse_features(&doc), Ok(ParseOutcome::Empty));
    }

    #[test]
    fn test_malformed_nesting_is_skipped() {
        let geometry = json!({ "type": "MultiPolygon", "coordinates": [[[0.0, 1.0]]] });
        let doc = json!({
            "type": "FeatureCollection",
            "features": [entry(json!("A"), geometry)],
        });
        assert_eq!(parse_features(&doc), Ok(ParseOutcome::Empty));
    }

    #[test]
    fn test_skips_preserve_order_of_survivors() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                entry(json!("A"), multi_polygon()),
                json!({ "geometry": multi_polygon() }),
                entry(json!("B"), multi_polygon()),
                json!({ "properties": { "NAME": "C" } }),
                entry(json!("D"), multi_polygon()),
            ],
        });
        let ParseOutcome::Layer(features) = parse_features(&doc).unwrap() else {
            panic!("expected a layer");
        };
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "D"]);
    }
}
