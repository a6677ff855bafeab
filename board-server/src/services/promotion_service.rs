// Promotion service - moves engaging posts into the recommended feed
use chrono::{Duration, NaiveDateTime};

use crate::config::PromotionConfig;
use crate::db::Database;
use crate::error::Result;

#[derive(Clone)]
pub struct PromotionService {
    db: Database,
    rule: PromotionConfig,
}

impl PromotionService {
    pub fn new(db: Database, rule: PromotionConfig) -> Self {
        Self { db, rule }
    }

    pub fn rule(&self) -> &PromotionConfig {
        &self.rule
    }

    /// Promotes every active, non-notice post created inside the window that
    /// meets the view or like threshold and is not recommended yet.
    ///
    /// Returns how many posts were newly promoted. Running it again against
    /// unchanged data promotes nothing.
    pub async fn promote_eligible(&self, now: NaiveDateTime) -> Result<u64> {
        let cutoff = now - Duration::hours(self.rule.window_hours);

        let candidates: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM posts
            WHERE status = 1
              AND is_notice = 0
              AND created_at >= ?
              AND (views >= ? OR likes >= ?)
              AND id NOT IN (SELECT post_id FROM recommended_posts)
            ORDER BY id ASC
            "#,
        )
        .bind(cutoff)
        .bind(self.rule.min_views)
        .bind(self.rule.min_likes)
        .fetch_all(&self.db.pool)
        .await?;

        let mut promoted = 0;
        for post_id in candidates {
            promoted += sqlx::query("INSERT OR IGNORE INTO recommended_posts (post_id, promoted_at) VALUES (?, ?)")
                .bind(post_id)
                .bind(now)
                .execute(&self.db.pool)
                .await?
                .rows_affected();
        }

        Ok(promoted)
    }
}
