use serde_json::{json, Map, Value};
use sqlx::PgPool;
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models::cave::Cave;
use crate::database::models::cave_query::CaveQuery;
use crate::database::paginate::{page_bounds, PageOptions, Paginate};
use crate::database::query_builder::QueryBuilder;
use crate::filter::types::SortDirection;
use crate::filter::FilterData;

const TABLE: &str = "caves";

const INSERT_SQL: &str = "INSERT INTO caves (\
    id, name, coordinates, length, depth, pit_depth, number_of_pits, \
    county_name, topo_name, topo_indication, elevation, ownership, \
    required_gear, entrance_type, field_indication, map_status, geology, \
    geology_age, physiographic_province, narrative) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
    $15, $16, $17, $18, $19, $20)";

/// Outcome of a bulk insert. Failures are aggregated, not reported per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkInsertOutcome {
    pub inserted: usize,
    pub failed: usize,
}

pub struct CaveRepository {
    pool: PgPool,
}

impl CaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a single cave. A duplicate id surfaces as
    /// [`DatabaseError::Conflict`]; the insert is not retried.
    pub async fn insert(&self, cave: &Cave) -> Result<(), DatabaseError> {
        sqlx::query(INSERT_SQL)
            .bind(&cave.id)
            .bind(&cave.name)
            .bind(&cave.coordinates)
            .bind(cave.length)
            .bind(cave.depth)
            .bind(cave.pit_depth)
            .bind(cave.number_of_pits)
            .bind(&cave.county_name)
            .bind(&cave.topo_name)
            .bind(&cave.topo_indication)
            .bind(cave.elevation)
            .bind(&cave.ownership)
            .bind(&cave.required_gear)
            .bind(&cave.entrance_type)
            .bind(&cave.field_indication)
            .bind(&cave.map_status)
            .bind(&cave.geology)
            .bind(&cave.geology_age)
            .bind(&cave.physiographic_province)
            .bind(&cave.narrative)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DatabaseError::Conflict(format!("Cave '{}' already exists", cave.id))
                }
                _ => DatabaseError::Sqlx(e),
            })?;
        Ok(())
    }

    /// Best-effort unordered bulk insert. Individual row failures (typically
    /// duplicate ids) are swallowed with a debug log and counted in the
    /// outcome; callers get no per-row failure report.
    pub async fn insert_many(&self, caves: &[Cave]) -> BulkInsertOutcome {
        let mut outcome = BulkInsertOutcome::default();
        for cave in caves {
            match self.insert(cave).await {
                Ok(()) => outcome.inserted += 1,
                Err(e) => {
                    outcome.failed += 1;
                    debug!("Skipping cave '{}': {}", cave.id, e);
                }
            }
        }
        outcome
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Cave>, DatabaseError> {
        QueryBuilder::<Cave>::new(TABLE)?
            .filter(FilterData {
                where_clause: Some(json!({ "id": id })),
                ..Default::default()
            })?
            .select_optional(&self.pool)
            .await
    }

    pub async fn count(&self, query: &CaveQuery) -> Result<i64, DatabaseError> {
        QueryBuilder::<Cave>::new(TABLE)?
            .filter(FilterData {
                where_clause: Some(query.where_document()),
                ..Default::default()
            })?
            .count(&self.pool)
            .await
    }

    /// Runs a query and paginates the results: count the matches, clamp the
    /// requested page, then fetch one sorted page window.
    pub async fn find_paginated(
        &self,
        query: &CaveQuery,
        page: &PageOptions,
    ) -> Result<Paginate<Cave>, DatabaseError> {
        let where_document = query.where_document();
        let count = self.count(query).await?;
        let bounds = page_bounds(page.current_page, page.page_size, count);
        let sort = query.resolve_sort();
        let direction = match sort.sort {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        let mut order = Map::new();
        order.insert(sort.column, Value::String(direction.to_string()));

        let items = QueryBuilder::<Cave>::new(TABLE)?
            .filter(FilterData {
                where_clause: Some(where_document),
                order: Some(Value::Object(order)),
                limit: Some(page.page_size),
                offset: Some(bounds.skip),
            })?
            .select_all(&self.pool)
            .await?;

        Ok(Paginate {
            current_page: bounds.page,
            total_pages: bounds.total_pages,
            count,
            items,
        })
    }
}
