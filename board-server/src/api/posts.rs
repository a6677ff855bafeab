use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::ClientAddr;
use crate::models::{NewPost, Post, PostSummary, VoteKind};
use crate::services::PostService;
use crate::utils::{mask_address, parse_id, Paging};
use crate::AppState;

use super::{PageQuery, DEFAULT_PAGE_SIZE};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/recommended-posts", get(list_recommended))
        .route("/post/:id", get(get_post))
        .route("/post", post(create_post))
        .route("/post/", post(create_post))
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub success: bool,
    pub data: Vec<PostSummaryResponse>,
    pub pagination: PublicPagination,
}

#[derive(Debug, Serialize)]
pub struct PublicPagination {
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
}

#[derive(Debug, Serialize)]
pub struct PostSummaryResponse {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub likes: i64,
    pub dislikes: i64,
    pub views: i64,
    pub is_notice: bool,
    pub created_at: NaiveDateTime,
    pub author_ip: String,
    pub user_vote: Option<VoteKind>,
    pub promoted_at: Option<NaiveDateTime>,
}

impl From<PostSummary> for PostSummaryResponse {
    fn from(post: PostSummary) -> Self {
        let user_vote = post.user_vote();
        Self {
            id: post.id,
            author_ip: mask_address(&post.ip),
            author: post.author,
            title: post.title,
            likes: post.likes,
            dislikes: post.dislikes,
            views: post.views,
            is_notice: post.is_notice,
            created_at: post.created_at,
            user_vote,
            promoted_at: post.promoted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub views: i64,
    pub is_notice: bool,
    pub created_at: NaiveDateTime,
    pub author_ip: String,
    pub user_vote: Option<VoteKind>,
}

impl PostDetailResponse {
    fn new(post: Post, user_vote: Option<VoteKind>) -> Self {
        Self {
            id: post.id,
            author_ip: mask_address(&post.ip),
            author: post.author,
            title: post.title,
            content: post.content,
            likes: post.likes,
            dislikes: post.dislikes,
            views: post.views,
            is_notice: post.is_notice,
            created_at: post.created_at,
            user_vote,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub data: PostDetailResponse,
}

fn listing(posts: Vec<PostSummary>, paging: Paging) -> PostListResponse {
    let has_next = posts.len() == paging.limit as usize;
    PostListResponse {
        success: true,
        data: posts.into_iter().map(PostSummaryResponse::from).collect(),
        pagination: PublicPagination {
            page: paging.page,
            limit: paging.limit,
            has_next,
        },
    }
}

async fn list_posts(
    State(state): State<AppState>,
    ClientAddr(ip): ClientAddr,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> Result<Json<PostListResponse>> {
    let paging = Paging::new(query.page, query.limit, DEFAULT_PAGE_SIZE);

    let posts = PostService::new(state.db.clone()).list_board(paging, &ip).await?;

    Ok(Json(listing(posts, paging)))
}

async fn list_recommended(
    State(state): State<AppState>,
    ClientAddr(ip): ClientAddr,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> Result<Json<PostListResponse>> {
    let paging = Paging::new(query.page, query.limit, DEFAULT_PAGE_SIZE);

    let posts = PostService::new(state.db.clone()).list_recommended(paging, &ip).await?;

    Ok(Json(listing(posts, paging)))
}

async fn get_post(
    State(state): State<AppState>,
    ClientAddr(ip): ClientAddr,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>> {
    let post_id = parse_id(&id, "post")?;

    let (post, user_vote) = PostService::new(state.db.clone())
        .view_post(post_id, &ip)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(PostResponse {
        success: true,
        data: PostDetailResponse::new(post, user_vote),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Author is required (max 50 characters)"))]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

impl CreatePostRequest {
    fn trimmed(self) -> Self {
        Self {
            author: self.author.trim().to_string(),
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: PostDetailResponse,
}

async fn create_post(
    State(state): State<AppState>,
    ClientAddr(ip): ClientAddr,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePostRequest>, AppError>,
) -> Result<(StatusCode, Json<CreatePostResponse>)> {
    let payload = payload.trimmed();
    payload.validate()?;

    let post = PostService::new(state.db.clone())
        .create_post(NewPost {
            ip,
            author: payload.author,
            title: payload.title,
            content: payload.content,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            success: true,
            message: "Post created.",
            data: PostDetailResponse::new(post, None),
        }),
    ))
}
