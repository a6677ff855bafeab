// Shared-password gate in front of the whole board
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::AppState;

const REALM: &str = "Basic realm=\"Protected Area\"";

/// Checks an `Authorization` header value against the shared password.
/// The user name is ignored.
pub fn password_matches(header: &str, expected: &str) -> bool {
    let Some(encoded) = header.strip_prefix("Basic ") else {
        return false;
    };

    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };

    let Ok(credentials) = String::from_utf8(decoded) else {
        return false;
    };

    match credentials.split_once(':') {
        Some((_user, password)) => password == expected,
        None => false,
    }
}

pub async fn require_password(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let access = &state.config.access;
    if !access.enabled() {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| password_matches(h, &access.password))
        .unwrap_or(false);

    if !authorized {
        tracing::debug!(path = %request.uri().path(), "Rejected request without board password");
        return challenge();
    }

    next.run(request).await
}

fn challenge() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    response
}
