//! Roster repository.

use sqlx::PgPool;
use village_portal_core::{RosterFields, RosterMember, RosterMemberId, RosterOrder};

use super::{RepositoryError, RosterQuery};

#[derive(Debug, sqlx::FromRow)]
struct RosterRow {
    id: i32,
    full_name: String,
    degree: Option<String>,
    role: String,
    term: Option<String>,
    image: Option<String>,
    display_order: Option<i32>,
    active: bool,
}

impl From<RosterRow> for RosterMember {
    fn from(row: RosterRow) -> Self {
        Self {
            id: RosterMemberId::new(row.id),
            full_name: row.full_name,
            degree: row.degree,
            role: row.role,
            term: row.term,
            image: row.image,
            display_order: row.display_order,
            active: row.active,
        }
    }
}

/// Repository for the organizational roster.
pub struct RosterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RosterRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List members in display order (`display_order` ascending, unset last,
    /// newest id first on ties).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: RosterQuery) -> Result<Vec<RosterMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, RosterRow>(
            r"
            SELECT id, full_name, degree, role, term, image, display_order, active
            FROM portal.roster_member
            WHERE active OR NOT $1
            ORDER BY display_order ASC NULLS LAST, id DESC
            LIMIT $2
            ",
        )
        .bind(query.active_only)
        .bind(query.limit.map(i64::from))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a member and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, fields: &RosterFields) -> Result<RosterMemberId, RepositoryError> {
        let id: RosterMemberId = sqlx::query_scalar(
            r"
            INSERT INTO portal.roster_member
                (full_name, degree, role, term, image, display_order, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&fields.full_name)
        .bind(&fields.degree)
        .bind(&fields.role)
        .bind(&fields.term)
        .bind(&fields.image)
        .bind(fields.display_order)
        .bind(fields.active)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Overwrite a member. Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: RosterMemberId,
        fields: &RosterFields,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE portal.roster_member
            SET full_name = $2, degree = $3, role = $4, term = $5,
                image = $6, display_order = $7, active = $8
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&fields.full_name)
        .bind(&fields.degree)
        .bind(&fields.role)
        .bind(&fields.term)
        .bind(&fields.image)
        .bind(fields.display_order)
        .bind(fields.active)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a member. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: RosterMemberId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM portal.roster_member WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Set `display_order` for several members in one transaction.
    ///
    /// Either every update is applied or none is. Unknown ids are skipped and
    /// do not count towards the returned total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back on drop.
    pub async fn reorder(&self, orders: &[RosterOrder]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for order in orders {
            let result =
                sqlx::query("UPDATE portal.roster_member SET display_order = $2 WHERE id = $1")
                    .bind(order.id)
                    .bind(order.display_order)
                    .execute(&mut *tx)
                    .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }
}
