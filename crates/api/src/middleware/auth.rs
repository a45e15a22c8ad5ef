//! Bearer token authentication for admin routes.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{ApiError, set_sentry_user};
use crate::services::Claims;
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// Missing, malformed, badly signed and expired tokens are all rejected with
/// `401` and the error envelope. The account is not re-read from the store;
/// a token stays valid until it expires.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(claims): RequireAdmin) -> String {
///     format!("Hello, {}!", claims.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens().verify(token)?;

        if let Ok(id) = claims.account_id() {
            set_sentry_user(id.as_i32(), &claims.username);
        }

        Ok(Self(claims))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_owned()))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("malformed authorization header".to_owned()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| ApiError::Unauthorized("malformed authorization header".to_owned()))?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::Unauthorized(
            "malformed authorization header".to_owned(),
        ));
    }

    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/residents");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def.ghi"))).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&parts(Some("bearer  abc"))).unwrap(), "abc");
    }

    #[test]
    fn test_bearer_token_rejections() {
        for header in [None, Some("abc"), Some("Basic dXNlcjpwYXNz"), Some("Bearer ")] {
            let err = bearer_token(&parts(header)).unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)), "{header:?}");
        }
    }
}
