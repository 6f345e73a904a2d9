use axum::{http::StatusCode, response::Json};
use tracing::{error, info};

use crate::config;
use crate::database::cave_repository::CaveRepository;
use crate::database::manager::DatabaseManager;
use crate::database::models::cave::Cave;
use crate::error::ApiError;
use crate::services::cave_import::csv_to_caves;

/// POST /api/caves/import - bulk import caves from a CSV body.
///
/// Responds 202 with a preview of the converted records while the insert
/// finishes in a background task; callers must not assume the rows are
/// persisted when the response arrives.
pub async fn import_post(body: String) -> Result<(StatusCode, Json<Vec<Cave>>), ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::bad_request("CSV body is empty"));
    }

    let caves = csv_to_caves(&body);
    info!("Converted {} caves from CSV upload", caves.len());

    let preview: Vec<Cave> = caves
        .iter()
        .take(config::config().api.import_preview_rows)
        .cloned()
        .collect();

    tokio::spawn(async move {
        match DatabaseManager::pool().await {
            Ok(pool) => {
                let outcome = CaveRepository::new(pool).insert_many(&caves).await;
                info!(
                    "Bulk import finished: {} inserted, {} skipped",
                    outcome.inserted, outcome.failed
                );
            }
            Err(e) => error!("Bulk import aborted, no database pool: {}", e),
        }
    });

    Ok((StatusCode::ACCEPTED, Json(preview)))
}
