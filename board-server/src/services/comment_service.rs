use chrono::Utc;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Comment, NewComment, STATUS_ACTIVE};

pub struct CommentService {
    db: Database,
}

impl CommentService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Active comments of a post, grouped by root comment and ordered by id
    /// inside each group.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, ip, post_id, parent_id, author, content, status, created_at
            FROM comments
            WHERE post_id = ? AND status = ?
            ORDER BY
                CASE WHEN parent_id IS NULL THEN id ELSE parent_id END,
                CASE WHEN parent_id IS NULL THEN 0 ELSE 1 END,
                id ASC
            "#,
        )
        .bind(post_id)
        .bind(STATUS_ACTIVE)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(comments)
    }

    /// True when `comment_id` is an active comment on `post_id`.
    pub async fn is_active_on_post(&self, comment_id: i64, post_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM comments WHERE id = ? AND post_id = ? AND status = ?)",
        )
        .bind(comment_id)
        .bind(post_id)
        .bind(STATUS_ACTIVE)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (ip, post_id, parent_id, author, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, ip, post_id, parent_id, author, content, status, created_at
            "#,
        )
        .bind(&new_comment.ip)
        .bind(new_comment.post_id)
        .bind(new_comment.parent_id)
        .bind(&new_comment.author)
        .bind(&new_comment.content)
        .bind(Utc::now().naive_utc())
        .fetch_one(&self.db.pool)
        .await?;

        tracing::info!(
            comment_id = comment.id,
            post_id = comment.post_id,
            parent_id = ?comment.parent_id,
            "Comment created"
        );

        Ok(comment)
    }
}
