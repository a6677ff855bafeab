use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use super::VoteKind;

/// Board listing row, joined with the caller's vote and the recommended marker.
#[derive(Debug, Clone, FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub ip: String,
    pub author: String,
    pub title: String,
    pub likes: i64,
    pub dislikes: i64,
    pub views: i64,
    pub is_notice: bool,
    pub created_at: NaiveDateTime,
    pub user_vote: Option<String>,
    pub promoted_at: Option<NaiveDateTime>,
}

impl PostSummary {
    pub fn user_vote(&self) -> Option<VoteKind> {
        self.user_vote.as_deref().and_then(|v| v.parse().ok())
    }
}

/// Full post as stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: i64,
    pub ip: String,
    pub author: String,
    pub title: String,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub views: i64,
    pub is_notice: bool,
    pub status: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub ip: String,
    pub author: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct VoteCounts {
    pub likes: i64,
    pub dislikes: i64,
}
