use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::future::Future;
use std::sync::Arc;

use crate::{auth, AppError, AppState};

/// Extracts the JWT from either the __session cookie or the Authorization header
fn extract_token_from_request(parts: &Parts) -> Option<String> {
    if let Some(cookie_header) = parts.headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            // cookie = "name=value; name2=value2"
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(value) = cookie.strip_prefix("__session=") {
                    return Some(value.to_string());
                }
            }
        }
    }

    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    None
}

/// The employee making the request, identified by the token subject.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub uid: String,
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = extract_token_from_request(parts);
        let state = state.clone();

        async move {
            let token = token.ok_or_else(|| {
                AppError::Unauthorized(
                    "Missing authentication: no __session cookie or Authorization header".to_string(),
                )
            })?;

            let claims = auth::validate_jwt(&token, &state.config.jwt_secret, &state.config.jwt_issuer)
                .map_err(|e| {
                    tracing::debug!(error = %e, "Rejected token");
                    AppError::Unauthorized(e)
                })?;

            Ok(AuthenticatedUser { uid: claims.sub })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(name: header::HeaderName, value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_token_from_cookie() {
        let p = parts(header::COOKIE, "theme=dark; __session=abc.def.ghi");
        assert_eq!(extract_token_from_request(&p).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let p = parts(header::AUTHORIZATION, "Bearer xyz");
        assert_eq!(extract_token_from_request(&p).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_token() {
        let p = parts(header::ACCEPT, "application/json");
        assert!(extract_token_from_request(&p).is_none());
    }
}
