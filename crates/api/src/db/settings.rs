//! Key/value settings repository.

use sqlx::PgPool;

use super::RepositoryError;

/// Repository for `portal.setting`.
pub struct SettingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM portal.setting WHERE key = $1")
                .bind(key)
                .fetch_optional(self.pool)
                .await?;
        Ok(value)
    }

    /// Insert or replace a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO portal.setting (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            ",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Remove a setting.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM portal.setting WHERE key = $1")
            .bind(key)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
