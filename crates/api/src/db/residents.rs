//! Resident repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use village_portal_core::{Resident, ResidentFields, ResidentId, Sex};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct ResidentRow {
    id: i32,
    full_name: String,
    sex: Option<Sex>,
    birthplace: Option<String>,
    birth_date: Option<NaiveDate>,
    religion: Option<String>,
    occupation: Option<String>,
    hamlet: String,
    rw: String,
    rt: String,
    status: Option<String>,
    category: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ResidentRow> for Resident {
    fn from(row: ResidentRow) -> Self {
        Self {
            id: ResidentId::new(row.id),
            full_name: row.full_name,
            sex: row.sex,
            birthplace: row.birthplace,
            birth_date: row.birth_date,
            religion: row.religion,
            occupation: row.occupation,
            hamlet: row.hamlet,
            rw: row.rw,
            rt: row.rt,
            status: row.status,
            category: row.category,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the resident registry.
pub struct ResidentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResidentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every resident, newest id first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Resident>, RepositoryError> {
        let rows = sqlx::query_as::<_, ResidentRow>(
            r"
            SELECT id, full_name, sex, birthplace, birth_date, religion, occupation,
                   hamlet, rw, rt, status, category, address, created_at, updated_at
            FROM portal.resident
            ORDER BY id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a resident and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, fields: &ResidentFields) -> Result<ResidentId, RepositoryError> {
        let id: ResidentId = sqlx::query_scalar(
            r"
            INSERT INTO portal.resident
                (full_name, sex, birthplace, birth_date, religion, occupation,
                 hamlet, rw, rt, status, category, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(&fields.full_name)
        .bind(fields.sex)
        .bind(&fields.birthplace)
        .bind(fields.birth_date)
        .bind(&fields.religion)
        .bind(&fields.occupation)
        .bind(&fields.hamlet)
        .bind(&fields.rw)
        .bind(&fields.rt)
        .bind(&fields.status)
        .bind(&fields.category)
        .bind(&fields.address)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Overwrite a resident. Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ResidentId,
        fields: &ResidentFields,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE portal.resident
            SET full_name = $2, sex = $3, birthplace = $4, birth_date = $5,
                religion = $6, occupation = $7, hamlet = $8, rw = $9, rt = $10,
                status = $11, category = $12, address = $13
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&fields.full_name)
        .bind(fields.sex)
        .bind(&fields.birthplace)
        .bind(fields.birth_date)
        .bind(&fields.religion)
        .bind(&fields.occupation)
        .bind(&fields.hamlet)
        .bind(&fields.rw)
        .bind(&fields.rt)
        .bind(&fields.status)
        .bind(&fields.category)
        .bind(&fields.address)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a resident. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ResidentId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM portal.resident WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Most recent change to the registry, if any resident exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn last_updated(&self) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let latest: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(updated_at) FROM portal.resident")
                .fetch_one(self.pool)
                .await?;
        Ok(latest)
    }
}
