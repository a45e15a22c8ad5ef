//! Finance transaction repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use village_portal_core::{
    FinanceTransaction, TransactionFields, TransactionFilter, TransactionId, TransactionType,
};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i32,
    #[sqlx(rename = "type")]
    kind: TransactionType,
    amount: Decimal,
    description: String,
    date: NaiveDate,
    category: String,
}

impl TryFrom<TransactionRow> for FinanceTransaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        if row.amount.is_sign_negative() && !row.amount.is_zero() {
            return Err(RepositoryError::DataCorruption(format!(
                "negative amount on transaction {}",
                row.id
            )));
        }
        Ok(Self {
            id: TransactionId::new(row.id),
            kind: row.kind,
            amount: row.amount,
            description: row.description,
            date: row.date,
            category: row.category,
        })
    }
}

/// Repository for cash-fund transactions.
pub struct FinanceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FinanceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List transactions matching `filter`, newest date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored amount is negative.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<FinanceTransaction>, RepositoryError> {
        let mut query = build_list_query(filter);
        let rows = query
            .build_query_as::<TransactionRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Insert a transaction and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, fields: &TransactionFields) -> Result<TransactionId, RepositoryError> {
        let id: TransactionId = sqlx::query_scalar(
            r"
            INSERT INTO portal.finance_transaction (type, amount, description, date, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(fields.kind)
        .bind(fields.amount)
        .bind(&fields.description)
        .bind(fields.date)
        .bind(&fields.category)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Overwrite a transaction. Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: TransactionId,
        fields: &TransactionFields,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE portal.finance_transaction
            SET type = $2, amount = $3, description = $4, date = $5, category = $6
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(fields.kind)
        .bind(fields.amount)
        .bind(&fields.description)
        .bind(fields.date)
        .bind(&fields.category)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a transaction. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: TransactionId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM portal.finance_transaction WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Build the parameterized list statement for a filter.
fn build_list_query(filter: &TransactionFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT id, type, amount, description, date, category FROM portal.finance_transaction WHERE TRUE",
    );

    if let Some(kind) = filter.kind {
        query.push(" AND type = ").push_bind(kind);
    }
    if let Some(category) = &filter.category {
        query.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(month) = filter.month
        && let (Some(start), Some(end)) = (month.first_day(), month.next_first_day())
    {
        query
            .push(" AND date >= ")
            .push_bind(start)
            .push(" AND date < ")
            .push_bind(end);
    }

    query.push(" ORDER BY date DESC, id DESC");

    if let Some(limit) = filter.limit {
        query.push(" LIMIT ").push_bind(i64::from(limit));
    }
    query
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use village_portal_core::TransactionQuery;

    use super::*;

    #[test]
    fn test_list_query_without_filter() {
        let query = build_list_query(&TransactionFilter::default());
        assert_eq!(
            query.sql(),
            "SELECT id, type, amount, description, date, category FROM portal.finance_transaction WHERE TRUE ORDER BY date DESC, id DESC"
        );
    }

    #[test]
    fn test_list_query_binds_every_filter() {
        let filter = TransactionQuery {
            kind: Some("income".to_string()),
            category: Some("Iuran".to_string()),
            month: Some("2024-08".to_string()),
            limit: Some("10".to_string()),
        }
        .into_filter()
        .unwrap();

        let query = build_list_query(&filter);
        let sql = query.sql();
        assert!(sql.contains("AND type = $1"));
        assert!(sql.contains("AND category = $2"));
        assert!(sql.contains("AND date >= $3 AND date < $4"));
        assert!(sql.ends_with("ORDER BY date DESC, id DESC LIMIT $5"));
    }
}
