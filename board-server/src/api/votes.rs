use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::ClientAddr;
use crate::models::{VoteKind, VoteOutcome};
use crate::services::VoteService;
use crate::utils::{empty_id_as_none, IdInput};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vote", post(cast_vote))
        .route("/vote/", post(cast_vote))
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(default, deserialize_with = "empty_id_as_none")]
    pub post_id: Option<IdInput>,
    #[serde(default, rename = "type")]
    pub vote_type: String,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: VoteOutcome,
}

async fn cast_vote(
    State(state): State<AppState>,
    ClientAddr(ip): ClientAddr,
    WithRejection(Json(payload), _): WithRejection<Json<VoteRequest>, AppError>,
) -> Result<Json<VoteResponse>> {
    let post_id = payload
        .post_id
        .as_ref()
        .and_then(IdInput::positive)
        .ok_or_else(|| AppError::BadRequest("Invalid post ID".to_string()))?;

    let kind: VoteKind = payload
        .vote_type
        .parse()
        .map_err(|_| AppError::BadRequest("Vote type must be 'like' or 'dislike'".to_string()))?;

    let (transition, outcome) = VoteService::new(state.db.clone())
        .cast_vote(post_id, &ip, kind)
        .await?;

    Ok(Json(VoteResponse {
        success: true,
        message: transition.message(),
        data: outcome,
    }))
}
