//! In-memory [`Store`] for tests.
//!
//! Mirrors the ordering and affected-row semantics of the `PostgreSQL`
//! repositories so handler tests exercise the same contract.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use village_portal_core::{
    Activity, ActivityFields, ActivityId, AdminAccount, AdminAccountId, FinanceTransaction,
    NewAdminAccount, Resident, ResidentFields, ResidentId, RosterFields, RosterMember,
    RosterMemberId, RosterOrder, TransactionFields, TransactionFilter, TransactionId,
};

use super::{RepositoryError, RosterQuery, Store};

#[derive(Default)]
struct Tables {
    next_id: i32,
    accounts: BTreeMap<AdminAccountId, AdminAccount>,
    residents: BTreeMap<ResidentId, Resident>,
    transactions: BTreeMap<TransactionId, FinanceTransaction>,
    activities: BTreeMap<ActivityId, Activity>,
    roster: BTreeMap<RosterMemberId, RosterMember>,
    settings: HashMap<String, String>,
}

impl Tables {
    /// Ids are unique across tables, which is stricter than needed but keeps
    /// accidental cross-table lookups from succeeding in tests.
    const fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`Store`] held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn resident_from(id: ResidentId, fields: &ResidentFields, created_at: DateTime<Utc>) -> Resident {
    let fields = fields.clone();
    Resident {
        id,
        full_name: fields.full_name,
        sex: fields.sex,
        birthplace: fields.birthplace,
        birth_date: fields.birth_date,
        religion: fields.religion,
        occupation: fields.occupation,
        hamlet: fields.hamlet,
        rw: fields.rw,
        rt: fields.rt,
        status: fields.status,
        category: fields.category,
        address: fields.address,
        created_at,
        updated_at: Utc::now(),
    }
}

fn transaction_from(id: TransactionId, fields: &TransactionFields) -> FinanceTransaction {
    FinanceTransaction {
        id,
        kind: fields.kind,
        amount: fields.amount,
        description: fields.description.clone(),
        date: fields.date,
        category: fields.category.clone(),
    }
}

fn activity_from(id: ActivityId, fields: &ActivityFields) -> Activity {
    let fields = fields.clone();
    Activity {
        id,
        title: fields.title,
        date: fields.date,
        location: fields.location,
        status: fields.status,
        budget: fields.budget,
        image: fields.image,
        description: fields.description,
    }
}

fn roster_member_from(id: RosterMemberId, fields: &RosterFields) -> RosterMember {
    let fields = fields.clone();
    RosterMember {
        id,
        full_name: fields.full_name,
        degree: fields.degree,
        role: fields.role,
        term: fields.term,
        image: fields.image,
        display_order: fields.display_order,
        active: fields.active,
    }
}

fn take_limit<T>(mut rows: Vec<T>, limit: Option<u32>) -> Vec<T> {
    if let Some(limit) = limit {
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|a| a.username.as_str() == username)
            .cloned())
    }

    async fn account_by_id(
        &self,
        id: AdminAccountId,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn create_account(
        &self,
        account: &NewAdminAccount,
    ) -> Result<AdminAccount, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.values().any(|a| a.username == account.username) {
            return Err(RepositoryError::Conflict("username already exists".to_owned()));
        }
        let id = AdminAccountId::new(tables.next_id());
        let created = AdminAccount {
            id,
            username: account.username.clone(),
            password_hash: account.password_hash.clone(),
            display_name: account.display_name.clone(),
            last_login_at: None,
        };
        tables.accounts.insert(id, created.clone());
        Ok(created)
    }

    async fn record_login(
        &self,
        id: AdminAccountId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if let Some(account) = self.tables.write().await.accounts.get_mut(&id) {
            account.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn list_residents(&self) -> Result<Vec<Resident>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.residents.values().rev().cloned().collect())
    }

    async fn create_resident(&self, fields: &ResidentFields) -> Result<ResidentId, RepositoryError> {
        let mut tables = self.tables.write().await;
        let id = ResidentId::new(tables.next_id());
        tables
            .residents
            .insert(id, resident_from(id, fields, Utc::now()));
        Ok(id)
    }

    async fn update_resident(
        &self,
        id: ResidentId,
        fields: &ResidentFields,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.residents.get_mut(&id) {
            Some(existing) => {
                *existing = resident_from(id, fields, existing.created_at);
                1
            }
            None => 0,
        })
    }

    async fn delete_resident(&self, id: ResidentId) -> Result<u64, RepositoryError> {
        let removed = self.tables.write().await.residents.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn residents_last_updated(&self) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.residents.values().map(|r| r.updated_at).max())
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<FinanceTransaction>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<FinanceTransaction> = tables
            .transactions
            .values()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(take_limit(rows, filter.limit))
    }

    async fn create_transaction(
        &self,
        fields: &TransactionFields,
    ) -> Result<TransactionId, RepositoryError> {
        let mut tables = self.tables.write().await;
        let id = TransactionId::new(tables.next_id());
        tables.transactions.insert(id, transaction_from(id, fields));
        Ok(id)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        fields: &TransactionFields,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.transactions.get_mut(&id) {
            Some(existing) => {
                *existing = transaction_from(id, fields);
                1
            }
            None => 0,
        })
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<u64, RepositoryError> {
        let removed = self.tables.write().await.transactions.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn list_activities(&self, limit: Option<u32>) -> Result<Vec<Activity>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Activity> = tables.activities.values().cloned().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(take_limit(rows, limit))
    }

    async fn create_activity(&self, fields: &ActivityFields) -> Result<ActivityId, RepositoryError> {
        let mut tables = self.tables.write().await;
        let id = ActivityId::new(tables.next_id());
        tables.activities.insert(id, activity_from(id, fields));
        Ok(id)
    }

    async fn update_activity(
        &self,
        id: ActivityId,
        fields: &ActivityFields,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.activities.get_mut(&id) {
            Some(existing) => {
                *existing = activity_from(id, fields);
                1
            }
            None => 0,
        })
    }

    async fn delete_activity(&self, id: ActivityId) -> Result<u64, RepositoryError> {
        let removed = self.tables.write().await.activities.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn list_roster(&self, query: RosterQuery) -> Result<Vec<RosterMember>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<RosterMember> = tables
            .roster
            .values()
            .filter(|m| m.active || !query.active_only)
            .cloned()
            .collect();
        rows.sort_by(RosterMember::display_cmp);
        Ok(take_limit(rows, query.limit))
    }

    async fn create_roster_member(
        &self,
        fields: &RosterFields,
    ) -> Result<RosterMemberId, RepositoryError> {
        let mut tables = self.tables.write().await;
        let id = RosterMemberId::new(tables.next_id());
        tables.roster.insert(id, roster_member_from(id, fields));
        Ok(id)
    }

    async fn update_roster_member(
        &self,
        id: RosterMemberId,
        fields: &RosterFields,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.roster.get_mut(&id) {
            Some(existing) => {
                *existing = roster_member_from(id, fields);
                1
            }
            None => 0,
        })
    }

    async fn delete_roster_member(&self, id: RosterMemberId) -> Result<u64, RepositoryError> {
        let removed = self.tables.write().await.roster.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn reorder_roster(&self, orders: &[RosterOrder]) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        let mut affected = 0;
        for order in orders {
            if let Some(member) = tables.roster.get_mut(&order.id) {
                member.display_order = order.display_order;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.tables.read().await.settings.get(key).cloned())
    }

    async fn put_setting(&self, key: &str, value: Option<&str>) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        match value {
            Some(value) => {
                tables.settings.insert(key.to_owned(), value.to_owned());
            }
            None => {
                tables.settings.remove(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use village_portal_core::RosterDraft;

    use super::*;

    fn roster(name: &str, order: Option<i32>) -> RosterFields {
        RosterDraft {
            full_name: Some(name.to_string()),
            role: Some("Anggota".to_string()),
            display_order: order,
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_roster_listing_follows_display_order() {
        let store = MemoryStore::new();
        let a = store.create_roster_member(&roster("A", None)).await.unwrap();
        let b = store.create_roster_member(&roster("B", Some(2))).await.unwrap();
        let c = store.create_roster_member(&roster("C", Some(1))).await.unwrap();
        let d = store.create_roster_member(&roster("D", None)).await.unwrap();

        let ids: Vec<RosterMemberId> = store
            .list_roster(RosterQuery::default())
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![c, b, d, a]);
    }

    #[tokio::test]
    async fn test_reorder_counts_only_existing_members() {
        let store = MemoryStore::new();
        let a = store.create_roster_member(&roster("A", Some(1))).await.unwrap();
        let b = store.create_roster_member(&roster("B", Some(2))).await.unwrap();

        let affected = store
            .reorder_roster(&[
                RosterOrder { id: a, display_order: Some(2) },
                RosterOrder { id: b, display_order: Some(1) },
                RosterOrder { id: RosterMemberId::new(999), display_order: Some(3) },
            ])
            .await
            .unwrap();
        assert_eq!(affected, 2);

        let first = &store.list_roster(RosterQuery::default()).await.unwrap()[0];
        assert_eq!(first.id, b);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let account = NewAdminAccount {
            username: "admin".parse().unwrap(),
            password_hash: "hash".to_string(),
            display_name: "Admin".to_string(),
        };
        store.create_account(&account).await.unwrap();
        let err = store.create_account(&account).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_settings_put_and_clear() {
        let store = MemoryStore::new();
        store.put_setting("k", Some("v")).await.unwrap();
        assert_eq!(store.get_setting("k").await.unwrap().as_deref(), Some("v"));
        store.put_setting("k", None).await.unwrap();
        assert_eq!(store.get_setting("k").await.unwrap(), None);
    }
}
