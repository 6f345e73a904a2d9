use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalogued cave. `id`, `name` and `coordinates` are always present;
/// every descriptive field is independently nullable.
///
/// Records created through CSV import carry the `-1` / `"-1"` sentinel in
/// place of missing data rather than NULL - see `services::cave_import`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cave {
    /// State survey id: two letters followed by digits, unique per cave.
    pub id: String,
    pub name: String,
    /// `[longitude, latitude]`
    pub coordinates: Vec<f64>,
    pub length: Option<i64>,
    pub depth: Option<i64>,
    pub pit_depth: Option<i64>,
    pub number_of_pits: Option<i64>,
    pub county_name: Option<String>,
    pub topo_name: Option<String>,
    pub topo_indication: Option<String>,
    pub elevation: Option<i64>,
    pub ownership: Option<String>,
    pub required_gear: Option<String>,
    pub entrance_type: Option<String>,
    pub field_indication: Option<String>,
    pub map_status: Option<String>,
    pub geology: Option<String>,
    pub geology_age: Option<String>,
    pub physiographic_province: Option<String>,
    pub narrative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cave {
    /// Minimal record for map display and bulk listings.
    pub fn to_sparse(&self) -> SparseCave {
        SparseCave {
            id: self.id.clone(),
            name: self.name.clone(),
            coordinates: self.coordinates.clone(),
        }
    }
}

/// Sparse representation: identifier, name and location only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseCave {
    pub id: String,
    pub name: String,
    pub coordinates: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cave() -> Cave {
        Cave {
            id: "TN42".to_string(),
            name: "Big Room Cave".to_string(),
            coordinates: vec![-85.5, 35.1],
            length: Some(1200),
            depth: Some(90),
            pit_depth: None,
            number_of_pits: None,
            county_name: Some("Marion".to_string()),
            topo_name: None,
            topo_indication: None,
            elevation: Some(600),
            ownership: None,
            required_gear: None,
            entrance_type: None,
            field_indication: None,
            map_status: None,
            geology: None,
            geology_age: None,
            physiographic_province: None,
            narrative: Some("A large walking passage.".to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn sparse_keeps_only_id_name_coordinates() {
        let sparse = cave().to_sparse();
        let v = serde_json::to_value(&sparse).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["id"], "TN42");
        assert_eq!(obj["coordinates"], serde_json::json!([-85.5, 35.1]));
    }

    #[test]
    fn wire_format_is_camel_case() {
        let v = serde_json::to_value(cave()).unwrap();
        assert!(v.get("pitDepth").is_some());
        assert!(v.get("countyName").is_some());
        assert!(v.get("pit_depth").is_none());
    }

    #[test]
    fn optional_fields_default_to_none_when_missing() {
        let cave: Cave = serde_json::from_value(serde_json::json!({
            "id": "AL1",
            "name": "Test",
            "coordinates": [-86.0, 34.0]
        }))
        .unwrap();
        assert!(cave.length.is_none());
        assert!(cave.narrative.is_none());
    }
}
