//! HTTP middleware and extractors.
//!
//! - [`auth`] - Bearer token extractor for admin routes
//! - [`http`] - Request spans and CORS
//! - [`security_headers`] - Conservative response headers on every reply

pub mod auth;
pub mod http;
pub mod security_headers;

pub use auth::RequireAdmin;
pub use http::{cors_layer, make_request_span, record_response};
pub use security_headers::security_headers_middleware;
