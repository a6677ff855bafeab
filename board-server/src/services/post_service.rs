// Post service - public board reads and writes
use chrono::Utc;

use crate::db::Database;
use crate::error::Result;
use crate::models::{NewPost, Post, PostSummary, VoteKind, STATUS_ACTIVE};
use crate::utils::Paging;

use super::VoteService;

pub struct PostService {
    db: Database,
}

const SUMMARY_COLUMNS: &str = r#"
    p.id, p.ip, p.author, p.title, p.likes, p.dislikes, p.views, p.is_notice, p.created_at,
    v.vote_type AS user_vote,
    rp.promoted_at
"#;

impl PostService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Active posts, notices pinned first, then newest first.
    pub async fn list_board(&self, paging: Paging, viewer_ip: &str) -> Result<Vec<PostSummary>> {
        let query = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM posts p
            LEFT JOIN votes v ON v.post_id = p.id AND v.ip = ? AND v.status = 1
            LEFT JOIN recommended_posts rp ON rp.post_id = p.id
            WHERE p.status = ?
            ORDER BY p.is_notice DESC, p.id DESC
            LIMIT ? OFFSET ?
            "#
        );

        let posts = sqlx::query_as::<_, PostSummary>(&query)
            .bind(viewer_ip)
            .bind(STATUS_ACTIVE)
            .bind(i64::from(paging.limit))
            .bind(paging.offset())
            .fetch_all(&self.db.pool)
            .await?;

        Ok(posts)
    }

    /// Recommended feed, most recently promoted first.
    pub async fn list_recommended(&self, paging: Paging, viewer_ip: &str) -> Result<Vec<PostSummary>> {
        let query = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM posts p
            INNER JOIN recommended_posts rp ON rp.post_id = p.id
            LEFT JOIN votes v ON v.post_id = p.id AND v.ip = ? AND v.status = 1
            WHERE p.status = ?
            ORDER BY rp.id DESC
            LIMIT ? OFFSET ?
            "#
        );

        let posts = sqlx::query_as::<_, PostSummary>(&query)
            .bind(viewer_ip)
            .bind(STATUS_ACTIVE)
            .bind(i64::from(paging.limit))
            .bind(paging.offset())
            .fetch_all(&self.db.pool)
            .await?;

        Ok(posts)
    }

    /// Counts a view and returns the post with the viewer's active vote.
    /// Returns `None` for missing and soft-deleted posts.
    pub async fn view_post(&self, post_id: i64, viewer_ip: &str) -> Result<Option<(Post, Option<VoteKind>)>> {
        sqlx::query("UPDATE posts SET views = views + 1 WHERE id = ? AND status = ?")
            .bind(post_id)
            .bind(STATUS_ACTIVE)
            .execute(&self.db.pool)
            .await?;

        let votes = VoteService::new(self.db.clone());
        let (post, current_vote) = tokio::try_join!(
            self.get_active_post(post_id),
            votes.current_vote(post_id, viewer_ip),
        )?;

        Ok(post.map(|post| (post, current_vote)))
    }

    pub async fn get_active_post(&self, post_id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, ip, author, title, content, likes, dislikes, views, is_notice, status, created_at
            FROM posts
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(post_id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(post)
    }

    pub async fn is_active(&self, post_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ? AND status = ?)",
        )
        .bind(post_id)
        .bind(STATUS_ACTIVE)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (ip, author, title, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, ip, author, title, content, likes, dislikes, views, is_notice, status, created_at
            "#,
        )
        .bind(&new_post.ip)
        .bind(&new_post.author)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(Utc::now().naive_utc())
        .fetch_one(&self.db.pool)
        .await?;

        tracing::info!(post_id = post.id, "Post created");

        Ok(post)
    }
}
