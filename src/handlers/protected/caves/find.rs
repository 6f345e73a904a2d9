use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::validate::{field_errors, validate_cave_query, validate_page_options};
use crate::database::cave_repository::CaveRepository;
use crate::database::manager::DatabaseManager;
use crate::database::models::cave_query::CaveQuery;
use crate::database::paginate::PageOptions;
use crate::error::ApiError;
use crate::services::geo::{self, FormatOptions, ResponseFormat};

/// POST /api/caves/find request body: search criteria, pagination and
/// rendering options in one flat JSON object.
#[derive(Debug, Default, Deserialize)]
pub struct FindCavesRequest {
    #[serde(flatten)]
    pub query: CaveQuery,
    #[serde(flatten)]
    pub page: PageOptions,
    #[serde(flatten)]
    pub format: FormatOptions,
}

/// POST /api/caves/find - search the catalogue.
///
/// Returns the paginated envelope; items are rendered as full records,
/// sparse triples, or a single GeoJSON FeatureCollection depending on the
/// requested format.
pub async fn find_post(Json(request): Json<FindCavesRequest>) -> Result<Json<Value>, ApiError> {
    let mut violations = validate_cave_query(&request.query);
    violations.extend(validate_page_options(&request.page));
    if !violations.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid cave query",
            Some(field_errors(&violations)),
        ));
    }

    let pool = DatabaseManager::pool().await?;
    let caves = CaveRepository::new(pool)
        .find_paginated(&request.query, &request.page)
        .await?;

    let body = match request.format.format {
        ResponseFormat::GeoJson => {
            let page = caves.map_items(|items| {
                vec![geo::to_feature_collection(&items, request.format.sparse)]
            });
            serde_json::to_value(page)
        }
        ResponseFormat::Default if request.format.sparse => {
            let page = caves.map_items(|items| geo::to_sparse(&items));
            serde_json::to_value(page)
        }
        ResponseFormat::Default => serde_json::to_value(caves),
    }
    .map_err(|e| {
        tracing::error!("Response serialization error: {}", e);
        ApiError::internal_server_error("Failed to format response")
    })?;

    Ok(Json(body))
}
