use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::ClientAddr;
use crate::models::{CommentNode, NewComment};
use crate::services::{build_comment_tree, CommentService, PostService};
use crate::utils::{empty_id_as_none, parse_id, IdInput};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comments/:post_id", get(list_comments))
        .route("/comment", post(create_comment))
        .route("/comment/", post(create_comment))
}

#[derive(Debug, Serialize)]
pub struct CommentTreeResponse {
    pub success: bool,
    pub data: CommentTreeData,
}

#[derive(Debug, Serialize)]
pub struct CommentTreeData {
    pub post_id: i64,
    pub comments: Vec<CommentNode>,
    pub total_count: usize,
}

async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<CommentTreeResponse>> {
    let post_id = parse_id(&post_id, "post")?;

    if !PostService::new(state.db.clone()).is_active(post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let rows = CommentService::new(state.db.clone()).list_for_post(post_id).await?;
    let total_count = rows.len();

    Ok(Json(CommentTreeResponse {
        success: true,
        data: CommentTreeData {
            post_id,
            comments: build_comment_tree(rows),
            total_count,
        },
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[serde(default, deserialize_with = "empty_id_as_none")]
    pub post_id: Option<IdInput>,
    #[serde(default, deserialize_with = "empty_id_as_none")]
    pub parent_id: Option<IdInput>,
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Author is required (max 50 characters)"))]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCommentResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: CommentNode,
}

async fn create_comment(
    State(state): State<AppState>,
    ClientAddr(ip): ClientAddr,
    WithRejection(Json(mut payload), _): WithRejection<Json<CreateCommentRequest>, AppError>,
) -> Result<(StatusCode, Json<CreateCommentResponse>)> {
    payload.author = payload.author.trim().to_string();
    payload.content = payload.content.trim().to_string();

    let post_id = payload
        .post_id
        .as_ref()
        .and_then(IdInput::positive)
        .ok_or_else(|| AppError::BadRequest("Invalid post ID".to_string()))?;

    let parent_id = match &payload.parent_id {
        Some(raw) => Some(
            raw.positive()
                .ok_or_else(|| AppError::BadRequest("Invalid parent comment ID".to_string()))?,
        ),
        None => None,
    };

    payload.validate()?;

    if !PostService::new(state.db.clone()).is_active(post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let comments = CommentService::new(state.db.clone());

    if let Some(parent_id) = parent_id {
        if !comments.is_active_on_post(parent_id, post_id).await? {
            return Err(AppError::NotFound("Parent comment not found".to_string()));
        }
    }

    let comment = comments
        .create_comment(NewComment {
            ip,
            post_id,
            parent_id,
            author: payload.author,
            content: payload.content,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCommentResponse {
            success: true,
            message: "Comment created.",
            data: CommentNode::from(comment),
        }),
    ))
}
