use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::mask_address;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: i64,
    pub ip: String,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub content: String,
    pub status: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub ip: String,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub content: String,
}

/// A comment as shown on the board, with its replies nested underneath.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub author_ip: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub replies: Vec<CommentNode>,
}

impl From<Comment> for CommentNode {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author_ip: mask_address(&comment.ip),
            author: comment.author,
            content: comment.content,
            created_at: comment.created_at,
            replies: Vec::new(),
        }
    }
}
