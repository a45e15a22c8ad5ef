//! Core types for the village portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod month;
pub mod status;
pub mod username;

pub use id::*;
pub use month::Month;
pub use status::*;
pub use username::{Username, UsernameError};
