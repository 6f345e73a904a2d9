//! Explicit per-request validation. Each request type gets one function
//! returning the full list of field-level violations; shapes stay plain data.

use std::collections::HashMap;

use crate::config;
use crate::database::models::cave::Cave;
use crate::database::models::cave_query::CaveQuery;
use crate::database::paginate::PageOptions;
use crate::services::auth_service::LoginRequest;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

fn violation(field: &str, message: &str) -> FieldViolation {
    FieldViolation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Collapses violations into the `field -> message` map carried by API
/// error bodies. Later violations for the same field win.
pub fn field_errors(violations: &[FieldViolation]) -> HashMap<String, String> {
    violations
        .iter()
        .map(|v| (v.field.clone(), v.message.clone()))
        .collect()
}

pub fn validate_cave_query(query: &CaveQuery) -> Vec<FieldViolation> {
    let mut violations = vec![];

    if let Some(radius) = &query.within_radius {
        if !(-90.0..=90.0).contains(&radius.latitude) {
            violations.push(violation("withinRadius.latitude", "Not a valid latitude"));
        }
        if !(-180.0..=180.0).contains(&radius.longitude) {
            violations.push(violation("withinRadius.longitude", "Not a valid longitude"));
        }
        if !radius.max_distance.is_finite() || radius.max_distance < 0.0 {
            violations.push(violation(
                "withinRadius.maxDistance",
                "Max distance must be a non-negative number",
            ));
        }
    }

    let comparisons = [
        ("length", &query.length),
        ("depth", &query.depth),
        ("pitDepth", &query.pit_depth),
        ("numberOfPits", &query.number_of_pits),
        ("elevation", &query.elevation),
    ];
    for (field, comparison) in comparisons {
        if let Some(comparison) = comparison {
            for bound in [comparison.greater_than, comparison.less_than]
                .into_iter()
                .flatten()
            {
                if !bound.is_finite() {
                    violations.push(violation(field, "Bounds must be finite numbers"));
                    break;
                }
            }
        }
    }

    violations
}

pub fn validate_page_options(page: &PageOptions) -> Vec<FieldViolation> {
    let mut violations = vec![];
    if page.page_size < 1 {
        violations.push(violation("pageSize", "Page size must be at least 1"));
    } else if page.page_size > config::config().api.max_page_size {
        violations.push(violation("pageSize", "Page size exceeds the maximum"));
    }
    violations
}

pub fn validate_login(request: &LoginRequest) -> Vec<FieldViolation> {
    let mut violations = vec![];
    if !is_plausible_email(&request.email) {
        violations.push(violation("email", "Not a valid email"));
    }
    if request.password.is_empty() {
        violations.push(violation("password", "Password cannot be blank"));
    }
    violations
}

pub fn validate_new_cave(cave: &Cave) -> Vec<FieldViolation> {
    let mut violations = vec![];
    if cave.id.trim().is_empty() {
        violations.push(violation("id", "Id cannot be blank"));
    }
    if cave.name.trim().is_empty() {
        violations.push(violation("name", "Name cannot be blank"));
    }
    if cave.coordinates.len() != 2 {
        violations.push(violation(
            "coordinates",
            "Coordinates must be [longitude, latitude]",
        ));
    } else {
        let (longitude, latitude) = (cave.coordinates[0], cave.coordinates[1]);
        if !(-180.0..=180.0).contains(&longitude) {
            violations.push(violation("coordinates", "Not a valid longitude"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            violations.push(violation("coordinates", "Not a valid latitude"));
        }
    }
    violations
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::cave_query::{NumberComparison, WithinRadius};

    #[test]
    fn empty_query_is_valid() {
        assert!(validate_cave_query(&CaveQuery::default()).is_empty());
    }

    #[test]
    fn out_of_range_latitude_is_flagged() {
        let query = CaveQuery {
            within_radius: Some(WithinRadius {
                latitude: 91.0,
                longitude: 0.0,
                max_distance: 10.0,
            }),
            ..Default::default()
        };
        let violations = validate_cave_query(&query);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "withinRadius.latitude");
    }

    #[test]
    fn negative_max_distance_is_flagged() {
        let query = CaveQuery {
            within_radius: Some(WithinRadius {
                latitude: 35.0,
                longitude: -85.0,
                max_distance: -1.0,
            }),
            ..Default::default()
        };
        assert_eq!(validate_cave_query(&query).len(), 1);
    }

    #[test]
    fn non_finite_bound_is_flagged() {
        let query = CaveQuery {
            length: Some(NumberComparison {
                greater_than: Some(f64::NAN),
                less_than: None,
            }),
            ..Default::default()
        };
        let violations = validate_cave_query(&query);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "length");
    }

    #[test]
    fn page_size_must_be_positive() {
        let page = PageOptions {
            current_page: 0,
            page_size: 0,
        };
        assert!(!validate_page_options(&page).is_empty());
    }

    #[test]
    fn negative_page_index_is_not_a_violation() {
        // out-of-range pages clamp, they never error
        let page = PageOptions {
            current_page: -5,
            page_size: 10,
        };
        assert!(validate_page_options(&page).is_empty());
    }

    #[test]
    fn login_requires_email_and_password() {
        let request = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let violations = validate_login(&request);
        assert_eq!(violations.len(), 2);
        let errors = field_errors(&violations);
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn well_formed_login_passes() {
        let request = LoginRequest {
            email: "caver@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(validate_login(&request).is_empty());
    }

    #[test]
    fn new_cave_needs_two_in_range_coordinates() {
        let cave: Cave = serde_json::from_value(serde_json::json!({
            "id": "TN1",
            "name": "Test",
            "coordinates": [-200.0, 95.0]
        }))
        .unwrap();
        let violations = validate_new_cave(&cave);
        assert_eq!(violations.len(), 2);
    }
}
