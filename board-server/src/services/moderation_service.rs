// Moderation service - admin listing, soft/hard delete, restore and notices
use std::str::FromStr;

use sqlx::{QueryBuilder, Sqlite};

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Comment, Post, STATUS_ACTIVE, STATUS_DELETED};
use crate::utils::Paging;

pub struct ModerationService {
    db: Database,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    Active,
    Deleted,
    #[default]
    All,
}

impl StatusFilter {
    fn status(&self) -> Option<i64> {
        match self {
            StatusFilter::Active => Some(STATUS_ACTIVE),
            StatusFilter::Deleted => Some(STATUS_DELETED),
            StatusFilter::All => None,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(StatusFilter::Active),
            "deleted" => Ok(StatusFilter::Deleted),
            "all" | "" => Ok(StatusFilter::All),
            other => Err(AppError::BadRequest(format!("Unknown status filter: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListContentParams {
    pub paging: Paging,
    pub status: StatusFilter,
    pub search: Option<String>,
}

impl ListContentParams {
    fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)))
    }
}

/// Escapes LIKE wildcards so search text matches literally (`ESCAPE '\'`).
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Soft delete flips the status flag; hard delete removes the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Soft,
    Hard,
}

const POST_COLUMNS: &str =
    "id, ip, author, title, content, likes, dislikes, views, is_notice, status, created_at";
const COMMENT_COLUMNS: &str = "id, ip, post_id, parent_id, author, content, status, created_at";

impl ModerationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List posts of any status with pagination and filters
    pub async fn list_posts(&self, params: &ListContentParams) -> Result<(Vec<Post>, i64)> {
        let pattern = params.search_pattern();

        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE 1=1"));
        push_filters(&mut query, params.status, pattern.as_deref(), &["title", "author", "content"]);
        query
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(i64::from(params.paging.limit))
            .push(" OFFSET ")
            .push_bind(params.paging.offset());

        let posts = query.build_query_as::<Post>().fetch_all(&self.db.pool).await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts WHERE 1=1");
        push_filters(&mut count, params.status, pattern.as_deref(), &["title", "author", "content"]);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db.pool).await?;

        Ok((posts, total))
    }

    /// List comments of any status with pagination and filters
    pub async fn list_comments(&self, params: &ListContentParams) -> Result<(Vec<Comment>, i64)> {
        let pattern = params.search_pattern();

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE 1=1"));
        push_filters(&mut query, params.status, pattern.as_deref(), &["author", "content"]);
        query
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(i64::from(params.paging.limit))
            .push(" OFFSET ")
            .push_bind(params.paging.offset());

        let comments = query.build_query_as::<Comment>().fetch_all(&self.db.pool).await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM comments WHERE 1=1");
        push_filters(&mut count, params.status, pattern.as_deref(), &["author", "content"]);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db.pool).await?;

        Ok((comments, total))
    }

    /// Soft delete hides the post; hard delete removes it together with its
    /// comments, votes and recommended marker.
    pub async fn delete_post(&self, post_id: i64, mode: DeleteMode) -> Result<()> {
        let result = match mode {
            DeleteMode::Soft => {
                sqlx::query("UPDATE posts SET status = ? WHERE id = ?")
                    .bind(STATUS_DELETED)
                    .bind(post_id)
                    .execute(&self.db.pool)
                    .await?
            }
            DeleteMode::Hard => {
                sqlx::query("DELETE FROM posts WHERE id = ?")
                    .bind(post_id)
                    .execute(&self.db.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        Ok(())
    }

    pub async fn restore_post(&self, post_id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE posts SET status = ? WHERE id = ?")
            .bind(STATUS_ACTIVE)
            .bind(post_id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        Ok(())
    }

    pub async fn set_notice(&self, post_id: i64, is_notice: bool) -> Result<()> {
        let result = sqlx::query("UPDATE posts SET is_notice = ? WHERE id = ?")
            .bind(is_notice)
            .bind(post_id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        Ok(())
    }

    /// Hard-deleting a comment also removes the replies beneath it.
    pub async fn delete_comment(&self, comment_id: i64, mode: DeleteMode) -> Result<()> {
        let result = match mode {
            DeleteMode::Soft => {
                sqlx::query("UPDATE comments SET status = ? WHERE id = ?")
                    .bind(STATUS_DELETED)
                    .bind(comment_id)
                    .execute(&self.db.pool)
                    .await?
            }
            DeleteMode::Hard => {
                sqlx::query("DELETE FROM comments WHERE id = ?")
                    .bind(comment_id)
                    .execute(&self.db.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", comment_id)));
        }

        Ok(())
    }

    pub async fn restore_comment(&self, comment_id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE comments SET status = ? WHERE id = ?")
            .bind(STATUS_ACTIVE)
            .bind(comment_id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", comment_id)));
        }

        Ok(())
    }
}

fn push_filters<'a>(
    query: &mut QueryBuilder<'a, Sqlite>,
    status: StatusFilter,
    pattern: Option<&str>,
    search_columns: &[&str],
) {
    if let Some(status) = status.status() {
        query.push(" AND status = ").push_bind(status);
    }

    if let Some(pattern) = pattern {
        query.push(" AND (");
        for (i, column) in search_columns.iter().enumerate() {
            if i > 0 {
                query.push(" OR ");
            }
            query
                .push(*column)
                .push(" LIKE ")
                .push_bind(pattern.to_string())
                .push(" ESCAPE '\\'");
        }
        query.push(")");
    }
}
