//! Startup provisioning of the default admin account.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::models::user::{User, UserRole, UserStatus};
use crate::database::user_repository::UserRepository;
use crate::services::auth_service::hash_password;

/// Upserts the configured default admin user, if enabled. Development
/// environments create it by default so a fresh checkout can log in.
pub async fn ensure_default_admin(pool: PgPool) -> Result<(), DatabaseError> {
    let bootstrap = &config::config().bootstrap;
    if !bootstrap.create_default_user {
        return Ok(());
    }
    if bootstrap.admin_email.is_empty() {
        warn!("Default user creation enabled but BOOTSTRAP_ADMIN_EMAIL is empty; skipping");
        return Ok(());
    }

    let password_hash = hash_password(&bootstrap.admin_password)
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

    let admin = User {
        id: Uuid::new_v4(),
        first_name: bootstrap.admin_first_name.clone(),
        last_name: bootstrap.admin_last_name.clone(),
        email: bootstrap.admin_email.clone(),
        password_hash,
        role: UserRole::Admin,
        status: UserStatus::Approved,
        phone_number: None,
        nss_number: None,
        created_at: None,
        updated_at: None,
    };

    UserRepository::new(pool).upsert_by_email(&admin).await?;
    info!("Default admin user ensured: {}", admin.email);

    if bootstrap.admin_password == "password" {
        warn!("Default admin is using the well-known development password");
    }

    Ok(())
}
