use axum::{response::Json, Extension};

use crate::middleware::AuthUser;

/// GET /api/auth/whoami - echo the authenticated principal.
pub async fn whoami_get(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}
