use serde_json::json;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::user::{User, UserUpdate};
use crate::database::query_builder::QueryBuilder;
use crate::filter::FilterData;

const TABLE: &str = "users";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a user. A duplicate email surfaces as
    /// [`DatabaseError::Conflict`].
    pub async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, \
             role, status, phone_number, nss_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(&user.phone_number)
        .bind(user.nss_number)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(format!("User '{}' already exists", user.email))
            }
            _ => DatabaseError::Sqlx(e),
        })?;
        Ok(())
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        QueryBuilder::<User>::new(TABLE)?
            .filter(FilterData {
                where_clause: Some(json!({ "email": email })),
                ..Default::default()
            })?
            .select_optional(&self.pool)
            .await
    }

    /// Writes every mutable column of an existing row.
    async fn update(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE users SET first_name = $1, last_name = $2, email = $3, \
             password_hash = $4, role = $5, status = $6, phone_number = $7, \
             nss_number = $8, updated_at = now() WHERE id = $9",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(&user.phone_number)
        .bind(user.nss_number)
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Creates the user if the email is unknown, otherwise merges the given
    /// record into the stored one field by field and saves the result.
    pub async fn upsert_by_email(&self, user: &User) -> Result<(), DatabaseError> {
        match self.get_by_email(&user.email).await? {
            Some(existing) => {
                let mut merged = existing;
                UserUpdate::from(user).apply(&mut merged);
                self.update(&merged).await
            }
            None => self.insert(user).await,
        }
    }
}
