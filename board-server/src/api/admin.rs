use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::CurrentAdmin;
use crate::models::{Comment, Post};
use crate::services::{BoardStats, DeleteMode, ListContentParams, ModerationService, StatsService, StatusFilter};
use crate::utils::{lenient_count, lenient_flag, parse_id, Paging};
use crate::AppState;

use super::DEFAULT_PAGE_SIZE;

const PREVIEW_CHARS: usize = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/post/:id", delete(delete_post))
        .route("/post/:id/restore", post(restore_post))
        .route("/notice/:id", post(set_notice))
        .route("/comments", get(list_comments))
        .route("/comment/:id", delete(delete_comment))
        .route("/comment/:id/restore", post(restore_comment))
        .route("/stats", get(get_stats))
}

#[derive(Debug, Deserialize)]
pub struct ListContentQuery {
    #[serde(default, deserialize_with = "lenient_count")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListContentQuery {
    fn into_params(self) -> Result<ListContentParams> {
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse::<StatusFilter>()?,
            None => StatusFilter::default(),
        };

        Ok(ListContentParams {
            paging: Paging::new(self.page, self.limit, DEFAULT_PAGE_SIZE),
            status,
            search: self.search,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AdminPagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl AdminPagination {
    fn new(paging: Paging, total: i64) -> Self {
        let limit = i64::from(paging.limit);
        Self {
            page: paging.page,
            limit: paging.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: AdminPagination,
}

#[derive(Debug, Serialize)]
pub struct AdminPostResponse {
    pub id: i64,
    pub ip: String,
    pub author: String,
    pub title: String,
    pub content_preview: String,
    pub likes: i64,
    pub dislikes: i64,
    pub views: i64,
    pub is_notice: bool,
    pub status: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct AdminCommentResponse {
    pub id: i64,
    pub ip: String,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub content_preview: String,
    pub status: i64,
    pub created_at: NaiveDateTime,
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

impl From<Post> for AdminPostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            content_preview: preview(&post.content),
            ip: post.ip,
            author: post.author,
            title: post.title,
            likes: post.likes,
            dislikes: post.dislikes,
            views: post.views,
            is_notice: post.is_notice,
            status: post.status,
            created_at: post.created_at,
        }
    }
}

impl From<Comment> for AdminCommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content_preview: preview(&comment.content),
            ip: comment.ip,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author: comment.author,
            status: comment.status,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub hard: bool,
}

impl DeleteQuery {
    fn mode(&self) -> DeleteMode {
        if self.hard {
            DeleteMode::Hard
        } else {
            DeleteMode::Soft
        }
    }
}

async fn list_posts(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ListContentQuery>, AppError>,
) -> Result<Json<AdminListResponse<AdminPostResponse>>> {
    let params = query.into_params()?;

    let (posts, total) = ModerationService::new(state.db.clone()).list_posts(&params).await?;

    Ok(Json(AdminListResponse {
        success: true,
        data: posts.into_iter().map(AdminPostResponse::from).collect(),
        pagination: AdminPagination::new(params.paging, total),
    }))
}

async fn list_comments(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ListContentQuery>, AppError>,
) -> Result<Json<AdminListResponse<AdminCommentResponse>>> {
    let params = query.into_params()?;

    let (comments, total) = ModerationService::new(state.db.clone()).list_comments(&params).await?;

    Ok(Json(AdminListResponse {
        success: true,
        data: comments.into_iter().map(AdminCommentResponse::from).collect(),
        pagination: AdminPagination::new(params.paging, total),
    }))
}

async fn delete_post(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    Path(id): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<DeleteQuery>, AppError>,
) -> Result<Json<ActionResponse>> {
    let post_id = parse_id(&id, "post")?;
    let mode = query.mode();

    ModerationService::new(state.db.clone()).delete_post(post_id, mode).await?;

    tracing::info!(admin = %current_admin.email, post_id, ?mode, "Post deleted");

    Ok(ActionResponse::ok(match mode {
        DeleteMode::Soft => "Post deleted.",
        DeleteMode::Hard => "Post permanently deleted.",
    }))
}

async fn restore_post(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>> {
    let post_id = parse_id(&id, "post")?;

    ModerationService::new(state.db.clone()).restore_post(post_id).await?;

    tracing::info!(admin = %current_admin.email, post_id, "Post restored");

    Ok(ActionResponse::ok("Post restored."))
}

/// Accepts `0`/`1` as well as `true`/`false`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NoticeFlag {
    Bool(bool),
    Number(i64),
}

impl NoticeFlag {
    fn is_set(&self) -> bool {
        match self {
            NoticeFlag::Bool(b) => *b,
            NoticeFlag::Number(n) => *n != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NoticeRequest {
    pub is_notice: NoticeFlag,
}

async fn set_notice(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<NoticeRequest>, AppError>,
) -> Result<Json<ActionResponse>> {
    let post_id = parse_id(&id, "post")?;
    let is_notice = payload.is_notice.is_set();

    ModerationService::new(state.db.clone()).set_notice(post_id, is_notice).await?;

    tracing::info!(admin = %current_admin.email, post_id, is_notice, "Notice flag changed");

    Ok(ActionResponse::ok(if is_notice {
        "Post pinned as notice."
    } else {
        "Post unpinned."
    }))
}

async fn delete_comment(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    Path(id): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<DeleteQuery>, AppError>,
) -> Result<Json<ActionResponse>> {
    let comment_id = parse_id(&id, "comment")?;
    let mode = query.mode();

    ModerationService::new(state.db.clone()).delete_comment(comment_id, mode).await?;

    tracing::info!(admin = %current_admin.email, comment_id, ?mode, "Comment deleted");

    Ok(ActionResponse::ok(match mode {
        DeleteMode::Soft => "Comment deleted.",
        DeleteMode::Hard => "Comment permanently deleted.",
    }))
}

async fn restore_comment(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>> {
    let comment_id = parse_id(&id, "comment")?;

    ModerationService::new(state.db.clone()).restore_comment(comment_id).await?;

    tracing::info!(admin = %current_admin.email, comment_id, "Comment restored");

    Ok(ActionResponse::ok("Comment restored."))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: BoardStats,
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = StatsService::new(state.db.clone()).get_stats().await?;

    Ok(Json(StatsResponse {
        success: true,
        data: stats,
    }))
}
