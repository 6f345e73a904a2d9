use axum::{extract::Path, http::StatusCode, response::Json};

use crate::api::validate::{field_errors, validate_new_cave};
use crate::database::cave_repository::CaveRepository;
use crate::database::manager::DatabaseManager;
use crate::database::models::cave::Cave;
use crate::error::ApiError;

/// GET /api/caves/:id - fetch a single cave by its survey id.
pub async fn record_get(Path(id): Path<String>) -> Result<Json<Cave>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let cave = CaveRepository::new(pool)
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cave does not exist"))?;
    Ok(Json(cave))
}

/// POST /api/caves - create a single cave. Duplicate ids are a 409 conflict.
pub async fn record_post(Json(cave): Json<Cave>) -> Result<StatusCode, ApiError> {
    let violations = validate_new_cave(&cave);
    if !violations.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid cave record",
            Some(field_errors(&violations)),
        ));
    }

    let pool = DatabaseManager::pool().await?;
    CaveRepository::new(pool).insert(&cave).await?;
    Ok(StatusCode::CREATED)
}
