//! Back-office account commands.
//!
//! # Usage
//!
//! ```bash
//! PORTAL_ADMIN_PASSWORD='...' vp-cli admin create -u ketua -n "Ketua RT 05"
//! ```

use thiserror::Error;
use village_portal_api::db::{self, PgStore, RepositoryError, Store};
use village_portal_api::services::AuthError;
use village_portal_api::services::auth::{hash_password, validate_password};
use village_portal_core::{AdminAccountId, NewAdminAccount, Username, UsernameError};

use super::{MissingEnvVar, database_url};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVar),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid display name: cannot be empty")]
    EmptyName,

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Account already exists with username: {0}")]
    UserExists(String),
}

/// Validate the inputs and hash the password.
///
/// Runs before any database connection so bad input fails fast.
pub fn prepare_account(
    username: &str,
    name: &str,
    password: &str,
) -> Result<NewAdminAccount, AdminError> {
    let username = Username::parse(username)?;
    let display_name = name.trim();
    if display_name.is_empty() {
        return Err(AdminError::EmptyName);
    }
    validate_password(password).map_err(AdminError::WeakPassword)?;

    Ok(NewAdminAccount {
        username,
        password_hash: hash_password(password)?,
        display_name: display_name.to_owned(),
    })
}

/// Insert an account unless the username is taken.
///
/// # Errors
///
/// Returns [`AdminError::UserExists`] for a duplicate username.
pub async fn insert_account(
    store: &dyn Store,
    account: &NewAdminAccount,
) -> Result<AdminAccountId, AdminError> {
    if store
        .account_by_username(account.username.as_str())
        .await?
        .is_some()
    {
        return Err(AdminError::UserExists(account.username.to_string()));
    }

    match store.create_account(account).await {
        Ok(created) => Ok(created.id),
        Err(RepositoryError::Conflict(_)) => {
            Err(AdminError::UserExists(account.username.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Create a new account.
///
/// # Errors
///
/// Returns an error for invalid input, a duplicate username, or a database
/// failure.
pub async fn create_user(
    username: &str,
    name: &str,
    password: &str,
) -> Result<AdminAccountId, AdminError> {
    let account = prepare_account(username, name, password)?;
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    let store = PgStore::new(db::create_pool(&url).await?);

    tracing::info!(username = %account.username, "Creating account");
    let id = insert_account(&store, &account).await?;

    tracing::info!(
        account_id = %id,
        username = %account.username,
        display_name = %account.display_name,
        "Account created successfully!"
    );
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use village_portal_api::db::MemoryStore;

    use super::*;

    #[test]
    fn test_prepare_account_rejects_bad_input() {
        assert!(matches!(
            prepare_account("pak rt", "Pak RT", "rahasia-rt05"),
            Err(AdminError::InvalidUsername(_))
        ));
        assert!(matches!(
            prepare_account("ketua", "  ", "rahasia-rt05"),
            Err(AdminError::EmptyName)
        ));
        assert!(matches!(
            prepare_account("ketua", "Ketua", "pendek"),
            Err(AdminError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_prepare_account_hashes_password() {
        let account = prepare_account("ketua", " Ketua RT 05 ", "rahasia-rt05").unwrap();
        assert_eq!(account.username.as_str(), "ketua");
        assert_eq!(account.display_name, "Ketua RT 05");
        assert!(account.password_hash.starts_with("$argon2"));
        assert!(!account.password_hash.contains("rahasia-rt05"));
    }

    #[tokio::test]
    async fn test_insert_account_rejects_duplicate() {
        let store = MemoryStore::new();
        let account = prepare_account("ketua", "Ketua", "rahasia-rt05").unwrap();

        insert_account(&store, &account).await.unwrap();
        assert!(matches!(
            insert_account(&store, &account).await,
            Err(AdminError::UserExists(ref name)) if name == "ketua"
        ));
    }
}
