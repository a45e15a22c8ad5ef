//! Business logic services.
//!
//! - [`auth`] - Password verification and hashing
//! - [`token`] - Bearer token issue and verification
//! - [`upload`] - Image upload storage

pub mod auth;
pub mod token;
pub mod upload;

pub use auth::{AuthError, AuthService};
pub use token::{Claims, TokenError, TokenService};
pub use upload::{Destination, IncomingImage, StoredImage, UploadError, UploadService};
