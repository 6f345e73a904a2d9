use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::filter::types::{FilterOrderInfo, SortDirection};

pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Converts a surface distance in miles to the central angle in radians used
/// by the geographic membership predicate.
pub fn miles_to_radians(miles: f64) -> f64 {
    miles / EARTH_RADIUS_MILES
}

/// Bounds for numeric criteria. Both bounds are exclusive; either side may be
/// omitted independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberComparison {
    pub greater_than: Option<f64>,
    pub less_than: Option<f64>,
}

/// Circular geographic region: center plus maximum distance in miles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithinRadius {
    pub latitude: f64,
    pub longitude: f64,
    pub max_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Relevance,
    Length,
    Depth,
    PitDepth,
    NumberOfPits,
    Elevation,
    Narrative,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Relevance
    }
}

impl SortBy {
    /// Storage column for an explicit sort field; `Relevance` has none and is
    /// resolved from the supplied criteria instead.
    fn column(self) -> Option<&'static str> {
        match self {
            SortBy::Relevance => None,
            SortBy::Length => Some("length"),
            SortBy::Depth => Some("depth"),
            SortBy::PitDepth => Some("pit_depth"),
            SortBy::NumberOfPits => Some("number_of_pits"),
            SortBy::Elevation => Some("elevation"),
            SortBy::Narrative => Some("narrative"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

impl SortOrder {
    fn direction(self) -> SortDirection {
        match self {
            SortOrder::Asc => SortDirection::Asc,
            SortOrder::Desc => SortDirection::Desc,
        }
    }
}

/// A validated cave search request. Built once per request and discarded;
/// every criterion is optional and absent criteria are simply omitted from
/// the generated filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaveQuery {
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,

    pub id: Option<String>,
    pub name: Option<String>,
    pub within_radius: Option<WithinRadius>,

    pub length: Option<NumberComparison>,
    pub depth: Option<NumberComparison>,
    pub pit_depth: Option<NumberComparison>,
    pub number_of_pits: Option<NumberComparison>,
    pub elevation: Option<NumberComparison>,

    pub county_names: Option<Vec<String>>,
    pub topo_names: Option<Vec<String>>,
    pub topo_indications: Option<Vec<String>>,
    pub ownership: Option<Vec<String>>,
    pub required_gear: Option<Vec<String>>,
    pub entrance_type: Option<Vec<String>>,
    pub field_indication: Option<Vec<String>>,
    pub map_status: Option<Vec<String>>,
    pub geology: Option<Vec<String>>,
    pub geology_age: Option<Vec<String>>,
    pub physiographic_province: Option<Vec<String>>,

    pub narrative: Option<String>,
}

impl CaveQuery {
    /// Builds the WHERE document for this query. Criteria are emitted
    /// independently and combined with AND; absent criteria are skipped.
    pub fn where_document(&self) -> Value {
        let mut doc = Map::new();

        if let Some(id) = &self.id {
            doc.insert("id".to_string(), json!({ "$ilike": substring_pattern(id) }));
        }
        if let Some(name) = &self.name {
            doc.insert(
                "name".to_string(),
                json!({ "$ilike": substring_pattern(name) }),
            );
        }

        if let Some(radius) = &self.within_radius {
            doc.insert(
                "coordinates".to_string(),
                json!({ "$geowithin": {
                    "center": [radius.longitude, radius.latitude],
                    "radiusRadians": miles_to_radians(radius.max_distance),
                }}),
            );
        }

        push_in_ci(&mut doc, "county_name", &self.county_names);
        push_in_ci(&mut doc, "topo_name", &self.topo_names);
        push_in_ci(&mut doc, "topo_indication", &self.topo_indications);
        push_in_ci(&mut doc, "ownership", &self.ownership);
        push_in_ci(&mut doc, "required_gear", &self.required_gear);
        push_in_ci(&mut doc, "entrance_type", &self.entrance_type);
        push_in_ci(&mut doc, "field_indication", &self.field_indication);
        push_in_ci(&mut doc, "map_status", &self.map_status);
        push_in_ci(&mut doc, "geology", &self.geology);
        push_in_ci(&mut doc, "geology_age", &self.geology_age);
        push_in_ci(&mut doc, "physiographic_province", &self.physiographic_province);

        if let Some(narrative) = &self.narrative {
            doc.insert("narrative".to_string(), json!({ "$text": narrative }));
        }

        push_number(&mut doc, "length", &self.length);
        push_number(&mut doc, "depth", &self.depth);
        push_number(&mut doc, "pit_depth", &self.pit_depth);
        push_number(&mut doc, "number_of_pits", &self.number_of_pits);
        push_number(&mut doc, "elevation", &self.elevation);

        Value::Object(doc)
    }

    /// Resolves the single sort key for this query.
    ///
    /// An explicit `sort_by` wins outright. In the default `Relevance` mode
    /// the key is inferred from which criteria were supplied, in fixed
    /// priority order, falling back to `length`.
    pub fn resolve_sort(&self) -> FilterOrderInfo {
        let column = match self.sort_by.column() {
            Some(column) => column,
            None => self.inferred_sort_column(),
        };
        FilterOrderInfo {
            column: column.to_string(),
            sort: self.sort_order.direction(),
        }
    }

    fn inferred_sort_column(&self) -> &'static str {
        if self.narrative.is_some() {
            "narrative"
        } else if self.length.is_some() {
            "length"
        } else if self.depth.is_some() {
            "depth"
        } else if self.pit_depth.is_some() {
            "pit_depth"
        } else if self.elevation.is_some() {
            "elevation"
        } else if self.number_of_pits.is_some() {
            "number_of_pits"
        } else {
            "length"
        }
    }
}

fn push_in_ci(doc: &mut Map<String, Value>, column: &str, values: &Option<Vec<String>>) {
    if let Some(values) = values {
        doc.insert(column.to_string(), json!({ "$inci": values }));
    }
}

fn push_number(doc: &mut Map<String, Value>, column: &str, comparison: &Option<NumberComparison>) {
    let Some(comparison) = comparison else {
        return;
    };
    let mut bounds = Map::new();
    if let Some(greater_than) = comparison.greater_than {
        bounds.insert("$gt".to_string(), json!(greater_than));
    }
    if let Some(less_than) = comparison.less_than {
        bounds.insert("$lt".to_string(), json!(less_than));
    }
    if !bounds.is_empty() {
        doc.insert(column.to_string(), Value::Object(bounds));
    }
}

/// Wraps a user-supplied fragment for case-insensitive substring matching,
/// escaping LIKE metacharacters so they match literally.
fn substring_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miles_to_radians_one_earth_radius() {
        assert_eq!(miles_to_radians(EARTH_RADIUS_MILES), 1.0);
        assert_eq!(miles_to_radians(0.0), 0.0);
    }

    #[test]
    fn empty_query_produces_empty_document() {
        let query = CaveQuery::default();
        assert_eq!(query.where_document(), json!({}));
    }

    #[test]
    fn id_and_name_use_substring_match() {
        let query = CaveQuery {
            id: Some("TN".to_string()),
            name: Some("ellison".to_string()),
            ..Default::default()
        };
        let doc = query.where_document();
        assert_eq!(doc["id"], json!({ "$ilike": "%TN%" }));
        assert_eq!(doc["name"], json!({ "$ilike": "%ellison%" }));
    }

    #[test]
    fn substring_fragments_escape_like_metacharacters() {
        assert_eq!(substring_pattern("50%_x"), "%50\\%\\_x%");
    }

    #[test]
    fn categorical_fields_use_case_insensitive_exact_membership() {
        let query = CaveQuery {
            county_names: Some(vec!["Jackson".to_string()]),
            geology: Some(vec!["Limestone".to_string()]),
            geology_age: Some(vec!["Ordovician".to_string()]),
            ..Default::default()
        };
        let doc = query.where_document();
        assert_eq!(doc["county_name"], json!({ "$inci": ["Jackson"] }));
        // geology and geology_age filter their own columns
        assert_eq!(doc["geology"], json!({ "$inci": ["Limestone"] }));
        assert_eq!(doc["geology_age"], json!({ "$inci": ["Ordovician"] }));
    }

    #[test]
    fn radius_filter_converts_miles_to_radians() {
        let query = CaveQuery {
            within_radius: Some(WithinRadius {
                latitude: 35.0,
                longitude: -85.5,
                max_distance: EARTH_RADIUS_MILES,
            }),
            ..Default::default()
        };
        let doc = query.where_document();
        assert_eq!(
            doc["coordinates"],
            json!({ "$geowithin": { "center": [-85.5, 35.0], "radiusRadians": 1.0 } })
        );
    }

    #[test]
    fn narrative_uses_full_text_search() {
        let query = CaveQuery {
            narrative: Some("waterfall dome".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.where_document()["narrative"],
            json!({ "$text": "waterfall dome" })
        );
    }

    #[test]
    fn numeric_bounds_are_strict_and_independent() {
        let query = CaveQuery {
            length: Some(NumberComparison {
                greater_than: Some(100.0),
                less_than: Some(500.0),
            }),
            depth: Some(NumberComparison {
                greater_than: Some(30.0),
                less_than: None,
            }),
            elevation: Some(NumberComparison::default()),
            ..Default::default()
        };
        let doc = query.where_document();
        assert_eq!(doc["length"], json!({ "$gt": 100.0, "$lt": 500.0 }));
        assert_eq!(doc["depth"], json!({ "$gt": 30.0 }));
        // a comparison with no bounds adds no condition
        assert!(doc.get("elevation").is_none());
    }

    #[test]
    fn explicit_sort_field_is_honored() {
        // The reference implementation had an assignment where a comparison
        // was intended, making explicit sorts unreachable; the comparison
        // semantics are intended behavior here.
        let query = CaveQuery {
            sort_by: SortBy::Depth,
            sort_order: SortOrder::Asc,
            narrative: Some("should not win".to_string()),
            ..Default::default()
        };
        let sort = query.resolve_sort();
        assert_eq!(sort.column, "depth");
        assert_eq!(sort.sort, SortDirection::Asc);
    }

    #[test]
    fn relevance_prefers_narrative_over_other_criteria() {
        let query = CaveQuery {
            narrative: Some("stream passage".to_string()),
            length: Some(NumberComparison {
                greater_than: Some(10.0),
                less_than: None,
            }),
            ..Default::default()
        };
        assert_eq!(query.resolve_sort().column, "narrative");
    }

    #[test]
    fn relevance_with_length_bound_sorts_by_length() {
        let query = CaveQuery {
            length: Some(NumberComparison {
                greater_than: Some(100.0),
                less_than: None,
            }),
            ..Default::default()
        };
        let sort = query.resolve_sort();
        assert_eq!(sort.column, "length");
        assert_eq!(sort.sort, SortDirection::Desc);
    }

    #[test]
    fn relevance_priority_walks_numeric_criteria() {
        let depth_only = CaveQuery {
            depth: Some(NumberComparison::default()),
            ..Default::default()
        };
        assert_eq!(depth_only.resolve_sort().column, "depth");

        let pits = CaveQuery {
            number_of_pits: Some(NumberComparison::default()),
            ..Default::default()
        };
        assert_eq!(pits.resolve_sort().column, "number_of_pits");

        let elevation_beats_pits = CaveQuery {
            elevation: Some(NumberComparison::default()),
            number_of_pits: Some(NumberComparison::default()),
            ..Default::default()
        };
        assert_eq!(elevation_beats_pits.resolve_sort().column, "elevation");
    }

    #[test]
    fn relevance_defaults_to_length() {
        let query = CaveQuery::default();
        let sort = query.resolve_sort();
        assert_eq!(sort.column, "length");
        assert_eq!(sort.sort, SortDirection::Desc);
    }

    #[test]
    fn exactly_one_sort_key_is_emitted() {
        let query = CaveQuery {
            narrative: Some("x".to_string()),
            length: Some(NumberComparison::default()),
            depth: Some(NumberComparison::default()),
            ..Default::default()
        };
        // resolve_sort returns a single FilterOrderInfo by construction
        assert_eq!(query.resolve_sort().column, "narrative");
    }

    #[test]
    fn deserializes_camel_case_request() {
        let query: CaveQuery = serde_json::from_value(json!({
            "sortBy": "pitDepth",
            "sortOrder": "Asc",
            "countyNames": ["Marion"],
            "pitDepth": { "greaterThan": 40 }
        }))
        .unwrap();
        assert_eq!(query.sort_by, SortBy::PitDepth);
        assert_eq!(query.sort_order, SortOrder::Asc);
        assert_eq!(query.county_names.as_deref(), Some(&["Marion".to_string()][..]));
        assert_eq!(query.pit_depth.unwrap().greater_than, Some(40.0));
    }
}
