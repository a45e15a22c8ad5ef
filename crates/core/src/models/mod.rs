//! Persisted entities and their create/update inputs.
//!
//! Every resource follows the same shape:
//!
//! - the entity (`Resident`, `FinanceTransaction`, ...) as returned by list
//!   endpoints, with its store-assigned id;
//! - a `*Draft` deserialized from the request body, all fields optional;
//! - a `*Fields` value produced by `Draft::validate`, which is what the store
//!   writes on create and update.

pub mod account;
pub mod activity;
pub mod finance;
pub mod resident;
pub mod roster;
pub mod setting;

pub use account::{AdminAccount, LoginRequest, LoginResponse, NewAdminAccount, PublicUser};
pub use activity::{Activity, ActivityDraft, ActivityFields};
pub use finance::{
    FinanceTransaction, MAX_LIMIT, TransactionDraft, TransactionFields, TransactionFilter,
    TransactionQuery,
};
pub use resident::{Resident, ResidentDraft, ResidentFields};
pub use roster::{ReorderRequest, RosterDraft, RosterFields, RosterMember, RosterOrder};
pub use setting::{HOME_HERO_KEY, HomeHero, HomeHeroDraft};
