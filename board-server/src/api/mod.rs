mod admin;
mod auth;
mod comments;
pub mod pages;
mod posts;
mod votes;

use axum::{middleware, Router};
use serde::Deserialize;

use crate::middleware::require_admin;
use crate::utils::lenient_count;
use crate::AppState;

pub(crate) const DEFAULT_PAGE_SIZE: u32 = 15;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "lenient_count")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: Option<u32>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .merge(posts::routes())
        .merge(comments::routes())
        .merge(votes::routes());

    let admin = Router::new()
        .merge(admin::routes())
        .route_layer(middleware::from_fn_with_state(state, require_admin))
        .nest("/auth", auth::routes());

    Router::new()
        .nest("/public", public)
        .nest("/admin", admin)
}
