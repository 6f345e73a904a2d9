use axum::{response::Json, extract::rejection::JsonRejection};

use crate::api::validate::{field_errors, validate_login};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::services::auth_service::{self, LoginRequest, TokenResponse};

/// POST /auth/login - authenticate with email/password and receive a JWT.
///
/// Returns 401 for unknown email or wrong password (indistinguishable), 422
/// for malformed request fields.
pub async fn login_post(
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let violations = validate_login(&request);
    if !violations.is_empty() {
        return Err(ApiError::unprocessable_entity(
            "Invalid login request",
            field_errors(&violations),
        ));
    }

    let pool = DatabaseManager::pool().await?;
    let token = auth_service::login(pool, &request).await?;
    Ok(Json(token))
}
