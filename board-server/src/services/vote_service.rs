// Vote service - one active vote per (post, address), counters kept in step
use chrono::Utc;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{VoteAction, VoteCounts, VoteKind, VoteOutcome, VoteTransition, STATUS_ACTIVE};

pub struct VoteService {
    db: Database,
}

impl VoteService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The address's active vote on a post, if any.
    pub async fn current_vote(&self, post_id: i64, ip: &str) -> Result<Option<VoteKind>> {
        let vote_type: Option<String> = sqlx::query_scalar(
            "SELECT vote_type FROM votes WHERE post_id = ? AND ip = ? AND status = 1",
        )
        .bind(post_id)
        .bind(ip)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(vote_type.and_then(|v| v.parse().ok()))
    }

    /// Applies a like/dislike request and returns the post's new counters.
    ///
    /// The vote row change and both counter updates commit together or not at
    /// all. Re-voting after a retraction reactivates the existing row.
    pub async fn cast_vote(&self, post_id: i64, ip: &str, requested: VoteKind) -> Result<(VoteTransition, VoteOutcome)> {
        let mut tx = self.db.pool.begin().await?;

        // A no-op write first: takes SQLite's write lock for the whole
        // transaction and tells us whether the post is live.
        let live = sqlx::query("UPDATE posts SET id = id WHERE id = ? AND status = ?")
            .bind(post_id)
            .bind(STATUS_ACTIVE)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if live == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        let current: Option<String> = sqlx::query_scalar(
            "SELECT vote_type FROM votes WHERE post_id = ? AND ip = ? AND status = 1",
        )
        .bind(post_id)
        .bind(ip)
        .fetch_optional(&mut *tx)
        .await?;
        let current = current.and_then(|v| v.parse::<VoteKind>().ok());

        let transition = VoteTransition::plan(current, requested);

        match transition.action {
            VoteAction::Added => {
                sqlx::query(
                    r#"
                    INSERT INTO votes (ip, post_id, vote_type, status, created_at)
                    VALUES (?, ?, ?, 1, ?)
                    ON CONFLICT (post_id, ip) DO UPDATE
                    SET vote_type = excluded.vote_type, status = 1, created_at = excluded.created_at
                    "#,
                )
                .bind(ip)
                .bind(post_id)
                .bind(requested.as_str())
                .bind(Utc::now().naive_utc())
                .execute(&mut *tx)
                .await?;
            }
            VoteAction::Removed => {
                sqlx::query("UPDATE votes SET status = 0 WHERE post_id = ? AND ip = ? AND status = 1")
                    .bind(post_id)
                    .bind(ip)
                    .execute(&mut *tx)
                    .await?;
            }
            VoteAction::Changed => {
                sqlx::query("UPDATE votes SET vote_type = ? WHERE post_id = ? AND ip = ? AND status = 1")
                    .bind(requested.as_str())
                    .bind(post_id)
                    .bind(ip)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let counts = sqlx::query_as::<_, VoteCounts>(
            r#"
            UPDATE posts
            SET likes = likes + ?, dislikes = dislikes + ?
            WHERE id = ?
            RETURNING likes, dislikes
            "#,
        )
        .bind(transition.likes_delta)
        .bind(transition.dislikes_delta)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            post_id,
            action = ?transition.action,
            vote = %requested,
            likes = counts.likes,
            dislikes = counts.dislikes,
            "Vote applied"
        );

        let outcome = VoteOutcome {
            post_id,
            action: transition.action,
            current_vote: transition.resulting,
            likes: counts.likes,
            dislikes: counts.dislikes,
        };

        Ok((transition, outcome))
    }
}
