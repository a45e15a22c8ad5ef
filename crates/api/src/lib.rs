//! Village Portal API library.
//!
//! The REST server behind the village portal: public reads for the website
//! and token-protected writes for the back office. Built as a library so the
//! router can be exercised in-process by tests and the integration crate.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`db`] - The [`db::Store`] trait and its `PostgreSQL` implementation
//! - [`services`] - Authentication, tokens and uploads
//! - [`middleware`] - Bearer extractor, tracing spans, CORS, headers
//! - [`routes`] - Handlers and the assembled [`routes::app`]
//! - [`error`] - [`error::ApiError`] and its envelope rendering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::PortalConfig;
pub use error::ApiError;
pub use routes::app;
pub use state::AppState;
