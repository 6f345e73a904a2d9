//! GeoJSON rendering of cave records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::models::cave::{Cave, SparseCave};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ResponseFormat {
    #[default]
    Default,
    GeoJson,
}

/// Rendering options for cave listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    #[serde(default)]
    pub format: ResponseFormat,
    /// Reduce each record to id, name and coordinates.
    #[serde(default)]
    pub sparse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeatureType {
    Feature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    FeatureCollection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: GeometryType,
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub properties: Value,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub features: Vec<Feature>,
}

/// Converts caves into a GeoJSON FeatureCollection. Sparse features carry
/// only id and name as properties; full features embed every descriptive
/// field except the geometry itself.
pub fn to_feature_collection(caves: &[Cave], sparse: bool) -> FeatureCollection {
    let features = caves
        .iter()
        .map(|cave| Feature {
            kind: FeatureType::Feature,
            properties: feature_properties(cave, sparse),
            geometry: Geometry {
                kind: GeometryType::Point,
                coordinates: cave.coordinates.clone(),
            },
        })
        .collect();

    FeatureCollection {
        kind: FeatureCollectionType::FeatureCollection,
        features,
    }
}

/// Converts caves to the sparse `{id, name, coordinates}` representation.
pub fn to_sparse(caves: &[Cave]) -> Vec<SparseCave> {
    caves.iter().map(Cave::to_sparse).collect()
}

fn feature_properties(cave: &Cave, sparse: bool) -> Value {
    if sparse {
        let mut properties = Map::new();
        properties.insert("id".to_string(), Value::String(cave.id.clone()));
        properties.insert("name".to_string(), Value::String(cave.name.clone()));
        return Value::Object(properties);
    }

    // Full record minus the geometry fields
    let mut properties = match serde_json::to_value(cave) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    properties.remove("coordinates");
    properties.remove("createdAt");
    properties.remove("updatedAt");
    Value::Object(properties)
}
