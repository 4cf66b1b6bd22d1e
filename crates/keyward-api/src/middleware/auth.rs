//! Bearer authentication with transparent renewal.
//!
//! A valid token puts an [`AuthContext`] into the request extensions; an
//! absent or invalid one leaves the request anonymous. When the token is
//! close to expiry and still live once the handler returns, a successor is
//! issued and returned in response headers.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use keyward_entity::session::IssuedToken;

use crate::extractors::AuthContext;
use crate::state::AppState;

/// Response header carrying a renewed bearer token.
pub const RENEWED_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-renewed-token");

/// Response header carrying the renewed token's expiry (epoch millis).
pub const RENEWED_TOKEN_EXPIRES_HEADER: HeaderName =
    HeaderName::from_static("x-renewed-token-expires-at");

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the bearer token to a session and renews it when expiring soon.
///
/// Renewal runs after the handler, so a token the handler revoked (logout,
/// kickout of the caller's own account) gets no successor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut presented = None;

    if let Some(token) = bearer_token(request.headers()).map(str::to_owned) {
        match state.session_manager.authenticate(&token) {
            Some(info) => {
                presented = Some(token.clone());
                request
                    .extensions_mut()
                    .insert(AuthContext { token, info });
            }
            None => debug!("Bearer token rejected, continuing anonymously"),
        }
    }

    let mut response = next.run(request).await;

    if let Some(token) = presented {
        if let Some(issued) = state.session_manager.renew_if_expiring(&token) {
            attach_renewal(response.headers_mut(), &issued);
        }
    }
    response
}

fn attach_renewal(headers: &mut HeaderMap, issued: &IssuedToken) {
    match HeaderValue::from_str(&issued.token) {
        Ok(value) => {
            headers.insert(RENEWED_TOKEN_HEADER, value);
            headers.insert(
                RENEWED_TOKEN_EXPIRES_HEADER,
                HeaderValue::from(issued.expires_at),
            );
        }
        Err(e) => warn!(error = %e, "Renewed token is not a valid header value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_renewal_headers() {
        let mut headers = HeaderMap::new();
        let issued = IssuedToken {
            token: "new.token.value".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: 1_700_000_000_000,
        };
        attach_renewal(&mut headers, &issued);

        assert_eq!(headers[RENEWED_TOKEN_HEADER], "new.token.value");
        assert_eq!(headers[RENEWED_TOKEN_EXPIRES_HEADER], "1700000000000");
    }
}
