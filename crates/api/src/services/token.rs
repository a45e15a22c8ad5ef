//! Bearer token service.
//!
//! Tokens are HS256 JWTs valid for seven days. There is no refresh and no
//! revocation: expiry is the only cutoff.

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use village_portal_core::{AdminAccountId, PublicUser};

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Token errors.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Encode(String),
}

/// Claims carried in a portal token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, as a decimal string.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The account id in `sub`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if `sub` is not an integer.
    pub fn account_id(&self) -> Result<AdminAccountId, TokenError> {
        self.sub
            .parse::<i32>()
            .map(AdminAccountId::new)
            .map_err(|_| TokenError::Invalid("subject is not an account id".to_owned()))
    }
}

/// Signs and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Issue a token for `user`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, user: &PublicUser) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue_at(&self, user: &PublicUser, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.to_string(),
            iat,
            exp: iat + TOKEN_TTL_SECONDS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` past `exp`, `TokenError::Invalid` otherwise.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret))
    }

    fn user() -> PublicUser {
        PublicUser {
            id: AdminAccountId::new(7),
            username: "ketua".parse().unwrap(),
            display_name: "Ketua RT".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service("k9#Qv2!mZ7@pL4$wX8^bN1&cR6*tY3%e");
        let token = tokens.issue(&user()).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.account_id().unwrap(), AdminAccountId::new(7));
        assert_eq!(claims.username, "ketua");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECONDS);
        assert_eq!(TOKEN_TTL_SECONDS, 604_800);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service("k9#Qv2!mZ7@pL4$wX8^bN1&cR6*tY3%e");
        let issued = Utc::now() - Duration::days(8);
        let token = tokens.issue_at(&user(), issued).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service("k9#Qv2!mZ7@pL4$wX8^bN1&cR6*tY3%e")
            .issue(&user())
            .unwrap();
        let other = service("another-signing-key-0123456789abcdef");
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service("k9#Qv2!mZ7@pL4$wX8^bN1&cR6*tY3%e");
        assert!(matches!(tokens.verify("not.a.jwt"), Err(TokenError::Invalid(_))));
    }
}
