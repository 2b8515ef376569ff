use serde::{Deserialize, Serialize};

/// A single `[x, y]` coordinate pair.
pub type Position = [f64; 2];

/// An ordered run of coordinate pairs forming one ring of a polygon.
pub type Ring = Vec<Position>;

/// A polygon: an outer ring followed by any interior rings.
pub type Polygon = Vec<Ring>;

/// The geometry of one feature: an ordered, non-empty set of polygons.
pub type PolygonSet = Vec<Polygon>;

/// A named polygon-set extracted from a geographic data document.
///
/// Field order doubles as the canonical key order of the wire encoding:
/// `name`, then `coordinates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub coordinates: PolygonSet,
}

impl Feature {
    pub fn new(name: &str, coordinates: PolygonSet) -> Self {
        Self {
            name: name.to_string(),
            coordinates,
        }
    }

    pub fn polygon_count(&self) -> usize {
        self.coordinates.len()
    }
}

/// A named collection of features, the unit of selection and rendering.
///
/// A layer always holds at least one feature. An empty collection is
/// represented as the absence of a layer, never as an empty `FeatureLayer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayer {
    pub name: String,
    pub features: Vec<Feature>,
}

impl FeatureLayer {
    /// Build a layer from a non-empty feature list.
    ///
    /// Returns `None` when `features` is empty.
    pub fn new(name: &str, features: Vec<Feature>) -> Option<Self> {
        if features.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            features,
        })
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}
