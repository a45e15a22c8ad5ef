//! Village Portal Client - typed access to the portal REST API.
//!
//! # Overview
//!
//! - [`PortalClient`] - One method per endpoint, returning core types
//! - [`Session`] - Authentication state, resolved once from a stored token
//! - [`TokenFile`] - Where the token lives between runs
//! - [`normalize`] - Tolerant list decoding for legacy and mirrored payloads
//!
//! # Example
//!
//! ```rust,ignore
//! use village_portal_client::{PortalClient, Session, TokenFile};
//!
//! let tokens = TokenFile::new(".portal-token");
//! let session = Session::load(&tokens).await;
//! let client = PortalClient::new("http://127.0.0.1:5000", session)?;
//!
//! let events = client.agenda().await?;
//! ```
//!
//! Aggregation (balances, per-category totals, resident statistics) lives in
//! `village_portal_core::report` and runs on the lists returned here.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod error;
pub mod normalize;
mod session;

pub use client::{PortalClient, UploadedImage};
pub use error::ClientError;
pub use normalize::{decode_list, normalize_list, or_empty};
pub use session::{Session, SessionClaims, TokenFile};
