use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{verify_jwt, AuthError, Claims};
use crate::database::models::user::{UserRole, UserStatus};
use crate::error::ApiError;

/// Authenticated principal extracted from a verified JWT.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: Uuid,
    pub full_name: String,
    pub role: UserRole,
    pub status: UserStatus,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            full_name: claims.full_name,
            role: claims.role,
            status: claims.status,
        }
    }
}

/// Bearer-token middleware for the protected API. Verifies the JWT, refuses
/// members whose status is not `Approved`, and injects [`AuthUser`] into the
/// request extensions.
pub async fn jwt_auth_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;
    let claims = verify_jwt(&token)?;

    if claims.status != UserStatus::Approved {
        return Err(AuthError::MembershipNotApproved.into());
    }

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| AuthError::MissingToken("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MissingToken("Invalid Authorization header format".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(AuthError::MissingToken("Empty bearer token".to_string())),
        None => Err(AuthError::MissingToken(
            "Authorization header must use Bearer token format".to_string(),
        )),
    }
}
