use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::auth::SESSION_COOKIE;
use crate::error::AppError;
use crate::AppState;

/// The signed-in admin, inserted into request extensions by `require_admin`.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub email: String,
    pub name: Option<String>,
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.admin(cookie.value()))
        .ok_or(AppError::Unauthorized)?;

    let email = session.email.ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(CurrentAdmin {
        email,
        name: session.name,
    });

    Ok(next.run(request).await)
}
