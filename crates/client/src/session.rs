//! Authentication state.
//!
//! The session is resolved once, when the client is built, from whatever
//! token was stored last time. The token's signature is not checked here:
//! only the server can do that. The payload is read so an expired token is
//! dropped before it is ever sent.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use village_portal_core::LoginResponse;

use crate::ClientError;

/// The readable part of a stored token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    #[serde(default)]
    pub username: String,
    pub exp: i64,
}

impl SessionClaims {
    /// Read the payload segment of a JWT without verifying it.
    ///
    /// Returns `None` for anything that is not three dot-separated segments
    /// with a base64url JSON payload carrying `sub` and `exp`.
    #[must_use]
    pub fn peek(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return None;
        };
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Whether the token has expired at `now`.
    #[must_use]
    pub const fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Who the client is talking as.
#[derive(Debug, Clone, Default)]
pub enum Session {
    /// No usable token. Public reads only.
    #[default]
    Anonymous,
    /// A token that had not expired when the session was resolved.
    Authenticated {
        token: SecretString,
        claims: SessionClaims,
    },
}

impl Session {
    /// Resolve a session from an optional stored token.
    ///
    /// Missing, malformed and expired tokens all give [`Session::Anonymous`].
    #[must_use]
    pub fn resolve(token: Option<&str>, now: DateTime<Utc>) -> Self {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::Anonymous;
        };
        match SessionClaims::peek(token) {
            Some(claims) if !claims.is_expired_at(now) => Self::Authenticated {
                token: SecretString::from(token.to_owned()),
                claims,
            },
            Some(claims) => {
                tracing::debug!(username = %claims.username, "Stored token expired");
                Self::Anonymous
            }
            None => {
                tracing::warn!("Stored token is not a readable JWT, ignoring it");
                Self::Anonymous
            }
        }
    }

    /// Resolve the session from a token file, at the current time.
    ///
    /// An unreadable file is logged and treated as no token.
    pub async fn load(file: &TokenFile) -> Self {
        match file.load().await {
            Ok(token) => Self::resolve(token.as_deref(), Utc::now()),
            Err(e) => {
                tracing::warn!(path = %file.path().display(), error = %e, "Failed to read token file");
                Self::Anonymous
            }
        }
    }

    /// The session a successful login produces.
    #[must_use]
    pub fn from_login(response: &LoginResponse) -> Self {
        Self::resolve(Some(&response.token), Utc::now())
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Username from the token, if authenticated.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Authenticated { claims, .. } => Some(&claims.username),
            Self::Anonymous => None,
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        match self {
            Self::Authenticated { token, .. } => Some(format!("Bearer {}", token.expose_secret())),
            Self::Anonymous => None,
        }
    }
}

/// A token persisted to a single file.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing or blank file is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn load(&self) -> Result<Option<String>, ClientError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub async fn save(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token).await?;
        Ok(())
    }

    /// Forget the stored token. Clearing an absent file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
