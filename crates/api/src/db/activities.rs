//! Activity repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use village_portal_core::{Activity, ActivityFields, ActivityId, ActivityStatus};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: i32,
    title: String,
    date: NaiveDate,
    location: Option<String>,
    status: ActivityStatus,
    budget: Option<Decimal>,
    image: Option<String>,
    description: Option<String>,
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: ActivityId::new(row.id),
            title: row.title,
            date: row.date,
            location: row.location,
            status: row.status,
            budget: row.budget,
            image: row.image,
            description: row.description,
        }
    }
}

/// Repository for activities.
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List activities, newest date first, optionally capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: Option<u32>) -> Result<Vec<Activity>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r"
            SELECT id, title, date, location, status, budget, image, description
            FROM portal.activity
            ORDER BY date DESC, id DESC
            LIMIT $1
            ",
        )
        // NULL means no limit
        .bind(limit.map(i64::from))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert an activity and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, fields: &ActivityFields) -> Result<ActivityId, RepositoryError> {
        let id: ActivityId = sqlx::query_scalar(
            r"
            INSERT INTO portal.activity (title, date, location, status, budget, image, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&fields.title)
        .bind(fields.date)
        .bind(&fields.location)
        .bind(fields.status)
        .bind(fields.budget)
        .bind(&fields.image)
        .bind(&fields.description)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Overwrite an activity. Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ActivityId,
        fields: &ActivityFields,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE portal.activity
            SET title = $2, date = $3, location = $4, status = $5,
                budget = $6, image = $7, description = $8
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&fields.title)
        .bind(fields.date)
        .bind(&fields.location)
        .bind(fields.status)
        .bind(fields.budget)
        .bind(&fields.image)
        .bind(&fields.description)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete an activity. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ActivityId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM portal.activity WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
