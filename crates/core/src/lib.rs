//! Village Portal Core - Shared types library.
//!
//! This crate provides the types used across all village portal components:
//! - `api` - REST API server (public reads + admin back office)
//! - `client` - Typed data-access layer over the REST API
//! - `cli` - Command-line tools for migrations, admin accounts and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Both the server and the client depend on it, so the
//! validation rules and the finance arithmetic are defined exactly once.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, usernames and the closed enumerations
//! - [`models`] - Persisted entities and their validated inputs
//! - [`validation`] - Field-level validation errors
//! - [`projection`] - `Event` and `Post` read models over activities
//! - [`report`] - Finance and resident aggregates
//! - [`envelope`] - The JSON response envelope shared by server and client
//! - [`media`] - Image reference resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod envelope;
pub mod media;
pub mod models;
pub mod projection;
pub mod report;
pub mod types;
pub mod validation;

pub use envelope::Envelope;
pub use models::*;
pub use types::*;
pub use validation::ValidationError;
