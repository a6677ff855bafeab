use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::auth::SESSION_COOKIE;
use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/google", get(google_login))
        .route("/google/callback", get(google_callback))
        .route("/check", get(check))
        .route("/logout", post(logout))
}

fn session_cookie(session_id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    // a repeated click reuses the pending session named by the cookie
    let resumed = jar.get(SESSION_COOKIE).and_then(|cookie| {
        let id = cookie.value().to_string();
        state.sessions.resume_login(&id).map(|oauth_state| (id, oauth_state))
    });
    let (session_id, oauth_state) = resumed.unwrap_or_else(|| state.sessions.begin_login());

    let url = state
        .identity
        .authorization_url(&oauth_state)
        .map_err(anyhow::Error::from)?;

    let jar = jar.add(session_cookie(session_id, state.config.admin.cookie_secure));

    Ok((jar, Redirect::to(&url)))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Query(query), _): WithRejection<Query<CallbackQuery>, AppError>,
) -> Result<(CookieJar, Redirect)> {
    if let Some(error) = query.error {
        tracing::warn!(%error, "OAuth provider returned an error");
        return Err(AppError::Unauthorized);
    }

    let pending_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::BadRequest("Login session missing".to_string()))?;

    let state_ok = query
        .state
        .as_deref()
        .map(|s| state.sessions.take_oauth_state(&pending_id, s))
        .unwrap_or(false);
    if !state_ok {
        return Err(AppError::BadRequest("Invalid OAuth state".to_string()));
    }

    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("Authorization code missing".to_string()))?;

    let identity = state.identity.exchange_code(&code).await.map_err(|e| {
        tracing::warn!(error = %e, "OAuth code exchange failed");
        AppError::Unauthorized
    })?;

    let admin_email = state.config.admin.email.trim();
    let is_admin = identity.email_verified
        && !admin_email.is_empty()
        && identity.email.eq_ignore_ascii_case(admin_email);

    if !is_admin {
        state.sessions.remove(&pending_id);
        tracing::warn!(email = %identity.email, "Rejected admin login");
        return Err(AppError::Forbidden);
    }

    let session_id = state
        .sessions
        .promote(&pending_id, identity.email.clone(), identity.name);

    tracing::info!(admin = %identity.email, "Admin signed in");

    let jar = jar.add(session_cookie(session_id, state.config.admin.cookie_secure));

    Ok((jar, Redirect::to(&state.config.oauth.post_login_redirect)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub success: bool,
    pub is_admin: bool,
    pub email: Option<String>,
    pub name: Option<String>,
}

async fn check(State(state): State<AppState>, jar: CookieJar) -> Json<CheckResponse> {
    let session = jar
        .get(SESSION_COOKIE)
        .and_then(|c| state.sessions.admin(c.value()));

    Json(match session {
        Some(session) => CheckResponse {
            success: true,
            is_admin: true,
            email: session.email,
            name: session.name,
        },
        None => CheckResponse {
            success: true,
            is_admin: false,
            email: None,
            name: None,
        },
    })
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: &'static str,
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    (
        jar,
        Json(LogoutResponse {
            success: true,
            message: "Logged out.",
        }),
    )
}
