//! Admin accounts and the login exchange.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AdminAccountId, Username};
use crate::validation::{ValidationError, required_text};

/// A back-office account.
///
/// Accounts are created by the CLI; the server only reads them and records
/// the last login time.
#[derive(Clone)]
pub struct AdminAccount {
    pub id: AdminAccountId,
    pub username: Username,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub display_name: String,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl AdminAccount {
    /// The projection that is safe to hand to clients.
    #[must_use]
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .field("last_login_at", &self.last_login_at)
            .finish()
    }
}

/// Input for creating an account.
#[derive(Clone)]
pub struct NewAdminAccount {
    pub username: Username,
    pub password_hash: String,
    pub display_name: String,
}

impl std::fmt::Debug for NewAdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdminAccount")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Account as exposed over the API. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: AdminAccountId,
    pub username: Username,
    pub display_name: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Check both credentials are present.
    ///
    /// The password is returned untrimmed; only blankness is checked.
    ///
    /// # Errors
    ///
    /// Returns an error naming `username` or `password` when blank.
    pub fn validate(self) -> Result<(String, String), ValidationError> {
        let username = required_text(self.username, "username")?;
        let password = self
            .password
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ValidationError::required("password"))?;
        Ok((username, password))
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_requires_both_fields() {
        let err = LoginRequest {
            username: Some("  ".to_string()),
            password: Some("secret".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "username");

        let err = LoginRequest {
            username: Some("admin".to_string()),
            password: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "password");
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let debug = format!("{:?}", LoginRequest::new("admin", "hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_public_user_omits_hash() {
        let account = AdminAccount {
            id: AdminAccountId::new(1),
            username: Username::parse("admin").unwrap(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            display_name: "Pak RT".to_string(),
            last_login_at: None,
        };
        let json = serde_json::to_string(&account.public()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"displayName\":\"Pak RT\""));
        assert!(!format!("{account:?}").contains("argon2"));
    }
}
