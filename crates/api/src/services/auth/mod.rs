//! Authentication service.
//!
//! Verifies admin credentials against Argon2id hashes. Accounts are created
//! out-of-band by the CLI, which uses [`hash_password`] from here.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use village_portal_core::{AdminAccount, LoginRequest};

use crate::db::Store;

/// Minimum password length accepted when creating accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash checked when the username is unknown, so a miss costs the same
/// Argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("village-portal-unknown-account").ok());

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Login with username and password.
    ///
    /// Unknown usernames and wrong passwords both yield
    /// `AuthError::InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is blank.
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, request: LoginRequest) -> Result<AdminAccount, AuthError> {
        let (username, password) = request.validate()?;

        let Some(account) = self.store.account_by_username(&username).await? else {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                // Result ignored: the account does not exist either way
                let _ = verify_password(&password, hash);
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(&password, &account.password_hash)?;

        Ok(account)
    }
}

/// Check a new password is acceptable.
///
/// # Errors
///
/// Returns a message describing the violated rule.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use village_portal_core::NewAdminAccount;

    use super::*;
    use crate::db::MemoryStore;

    async fn store_with_admin() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_account(&NewAdminAccount {
                username: "ketua".parse().unwrap(),
                password_hash: hash_password("rahasia-rt05").unwrap(),
                display_name: "Ketua RT".to_string(),
            })
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("rahasia-rt05").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("rahasia-rt05", &hash).is_ok());
        assert!(matches!(
            verify_password("salah", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unknown_account_hash_costs_a_real_verify() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        let parsed = PasswordHash::new(hash).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(matches!(
            verify_password("rahasia-rt05", hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
    }

    #[tokio::test]
    async fn test_login_success() {
        let store = store_with_admin().await;
        let account = AuthService::new(&store)
            .login(LoginRequest::new("ketua", "rahasia-rt05"))
            .await
            .unwrap();
        assert_eq!(account.display_name, "Ketua RT");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = store_with_admin().await;
        let service = AuthService::new(&store);

        let unknown = service
            .login(LoginRequest::new("bendahara", "rahasia-rt05"))
            .await
            .unwrap_err();
        let wrong = service
            .login(LoginRequest::new("ketua", "bukan-ini"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_login_blank_field() {
        let store = store_with_admin().await;
        let err = AuthService::new(&store)
            .login(LoginRequest::new("ketua", " "))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref e) if e.field == "password"));
    }
}
