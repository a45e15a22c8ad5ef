//! Persistence for the portal.
//!
//! # Tables (schema `portal`)
//!
//! - `admin_account` - Back-office logins (created by the CLI)
//! - `resident` - Resident registry
//! - `finance_transaction` - Cash-fund income and expenses
//! - `activity` - Activities, shown as agenda events and news posts
//! - `roster_member` - Organizational roster
//! - `setting` - Key/value overrides
//!
//! Handlers talk to the [`Store`] trait. [`PgStore`] implements it on top of
//! one repository per table; `MemoryStore` (feature `memory-store`) backs the
//! tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p village-portal-cli -- migrate
//! ```

pub mod accounts;
pub mod activities;
pub mod finance;
#[cfg(any(test, feature = "memory-store"))]
pub mod memory;
pub mod residents;
pub mod roster;
pub mod settings;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use village_portal_core::{
    Activity, ActivityFields, ActivityId, AdminAccount, AdminAccountId, FinanceTransaction,
    NewAdminAccount, Resident, ResidentFields, ResidentId, RosterFields, RosterMember,
    RosterMemberId, RosterOrder, TransactionFields, TransactionFilter, TransactionId,
};

pub use accounts::AccountRepository;
pub use activities::ActivityRepository;
pub use finance::FinanceRepository;
#[cfg(any(test, feature = "memory-store"))]
pub use memory::MemoryStore;
pub use residents::ResidentRepository;
pub use roster::RosterRepository;
pub use settings::SettingRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Which roster members to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterQuery {
    pub active_only: bool,
    pub limit: Option<u32>,
}

/// Storage operations used by the handlers.
///
/// Updates and deletes report the number of affected rows; 0 means the id
/// did not exist and is not an error.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // Accounts
    async fn account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, RepositoryError>;
    async fn account_by_id(
        &self,
        id: AdminAccountId,
    ) -> Result<Option<AdminAccount>, RepositoryError>;
    async fn create_account(
        &self,
        account: &NewAdminAccount,
    ) -> Result<AdminAccount, RepositoryError>;
    async fn record_login(
        &self,
        id: AdminAccountId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    // Residents, newest id first
    async fn list_residents(&self) -> Result<Vec<Resident>, RepositoryError>;
    async fn create_resident(&self, fields: &ResidentFields) -> Result<ResidentId, RepositoryError>;
    async fn update_resident(
        &self,
        id: ResidentId,
        fields: &ResidentFields,
    ) -> Result<u64, RepositoryError>;
    async fn delete_resident(&self, id: ResidentId) -> Result<u64, RepositoryError>;
    async fn residents_last_updated(&self) -> Result<Option<DateTime<Utc>>, RepositoryError>;

    // Finance, newest date first
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<FinanceTransaction>, RepositoryError>;
    async fn create_transaction(
        &self,
        fields: &TransactionFields,
    ) -> Result<TransactionId, RepositoryError>;
    async fn update_transaction(
        &self,
        id: TransactionId,
        fields: &TransactionFields,
    ) -> Result<u64, RepositoryError>;
    async fn delete_transaction(&self, id: TransactionId) -> Result<u64, RepositoryError>;

    // Activities, newest date first
    async fn list_activities(&self, limit: Option<u32>) -> Result<Vec<Activity>, RepositoryError>;
    async fn create_activity(&self, fields: &ActivityFields) -> Result<ActivityId, RepositoryError>;
    async fn update_activity(
        &self,
        id: ActivityId,
        fields: &ActivityFields,
    ) -> Result<u64, RepositoryError>;
    async fn delete_activity(&self, id: ActivityId) -> Result<u64, RepositoryError>;

    // Roster, in display order
    async fn list_roster(&self, query: RosterQuery) -> Result<Vec<RosterMember>, RepositoryError>;
    async fn create_roster_member(
        &self,
        fields: &RosterFields,
    ) -> Result<RosterMemberId, RepositoryError>;
    async fn update_roster_member(
        &self,
        id: RosterMemberId,
        fields: &RosterFields,
    ) -> Result<u64, RepositoryError>;
    async fn delete_roster_member(&self, id: RosterMemberId) -> Result<u64, RepositoryError>;
    /// Apply every order change atomically.
    async fn reorder_roster(&self, orders: &[RosterOrder]) -> Result<u64, RepositoryError>;

    // Settings
    async fn get_setting(&self, key: &str) -> Result<Option<String>, RepositoryError>;
    /// Store `value`, or remove the key when `None`.
    async fn put_setting(&self, key: &str, value: Option<&str>) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        AccountRepository::new(&self.pool).get_by_username(username).await
    }

    async fn account_by_id(
        &self,
        id: AdminAccountId,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        AccountRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_account(
        &self,
        account: &NewAdminAccount,
    ) -> Result<AdminAccount, RepositoryError> {
        AccountRepository::new(&self.pool).create(account).await
    }

    async fn record_login(
        &self,
        id: AdminAccountId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        AccountRepository::new(&self.pool).record_login(id, at).await
    }

    async fn list_residents(&self) -> Result<Vec<Resident>, RepositoryError> {
        ResidentRepository::new(&self.pool).list().await
    }

    async fn create_resident(&self, fields: &ResidentFields) -> Result<ResidentId, RepositoryError> {
        ResidentRepository::new(&self.pool).create(fields).await
    }

    async fn update_resident(
        &self,
        id: ResidentId,
        fields: &ResidentFields,
    ) -> Result<u64, RepositoryError> {
        ResidentRepository::new(&self.pool).update(id, fields).await
    }

    async fn delete_resident(&self, id: ResidentId) -> Result<u64, RepositoryError> {
        ResidentRepository::new(&self.pool).delete(id).await
    }

    async fn residents_last_updated(&self) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        ResidentRepository::new(&self.pool).last_updated().await
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<FinanceTransaction>, RepositoryError> {
        FinanceRepository::new(&self.pool).list(filter).await
    }

    async fn create_transaction(
        &self,
        fields: &TransactionFields,
    ) -> Result<TransactionId, RepositoryError> {
        FinanceRepository::new(&self.pool).create(fields).await
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        fields: &TransactionFields,
    ) -> Result<u64, RepositoryError> {
        FinanceRepository::new(&self.pool).update(id, fields).await
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<u64, RepositoryError> {
        FinanceRepository::new(&self.pool).delete(id).await
    }

    async fn list_activities(&self, limit: Option<u32>) -> Result<Vec<Activity>, RepositoryError> {
        ActivityRepository::new(&self.pool).list(limit).await
    }

    async fn create_activity(&self, fields: &ActivityFields) -> Result<ActivityId, RepositoryError> {
        ActivityRepository::new(&self.pool).create(fields).await
    }

    async fn update_activity(
        &self,
        id: ActivityId,
        fields: &ActivityFields,
    ) -> Result<u64, RepositoryError> {
        ActivityRepository::new(&self.pool).update(id, fields).await
    }

    async fn delete_activity(&self, id: ActivityId) -> Result<u64, RepositoryError> {
        ActivityRepository::new(&self.pool).delete(id).await
    }

    async fn list_roster(&self, query: RosterQuery) -> Result<Vec<RosterMember>, RepositoryError> {
        RosterRepository::new(&self.pool).list(query).await
    }

    async fn create_roster_member(
        &self,
        fields: &RosterFields,
    ) -> Result<RosterMemberId, RepositoryError> {
        RosterRepository::new(&self.pool).create(fields).await
    }

    async fn update_roster_member(
        &self,
        id: RosterMemberId,
        fields: &RosterFields,
    ) -> Result<u64, RepositoryError> {
        RosterRepository::new(&self.pool).update(id, fields).await
    }

    async fn delete_roster_member(&self, id: RosterMemberId) -> Result<u64, RepositoryError> {
        RosterRepository::new(&self.pool).delete(id).await
    }

    async fn reorder_roster(&self, orders: &[RosterOrder]) -> Result<u64, RepositoryError> {
        RosterRepository::new(&self.pool).reorder(orders).await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        SettingRepository::new(&self.pool).get(key).await
    }

    async fn put_setting(&self, key: &str, value: Option<&str>) -> Result<(), RepositoryError> {
        let repo = SettingRepository::new(&self.pool);
        match value {
            Some(value) => repo.upsert(key, value).await,
            None => repo.delete(key).await,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
