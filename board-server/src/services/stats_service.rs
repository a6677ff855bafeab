// Stats service - aggregate counters for the admin panel
use serde::Serialize;

use crate::db::Database;
use crate::error::Result;

pub struct StatsService {
    db: Database,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    pub total_posts: i64,
    pub active_posts: i64,
    pub deleted_posts: i64,
    pub notices: i64,
    pub recommended: i64,
    pub total_comments: i64,
    pub active_comments: i64,
    pub deleted_comments: i64,
}

impl StatsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Runs the independent count queries together and joins the results.
    pub async fn get_stats(&self) -> Result<BoardStats> {
        let (total_posts, active_posts, notices, recommended, total_comments, active_comments) = tokio::try_join!(
            self.count("SELECT COUNT(*) FROM posts"),
            self.count("SELECT COUNT(*) FROM posts WHERE status = 1"),
            self.count("SELECT COUNT(*) FROM posts WHERE is_notice = 1 AND status = 1"),
            self.count("SELECT COUNT(*) FROM recommended_posts"),
            self.count("SELECT COUNT(*) FROM comments"),
            self.count("SELECT COUNT(*) FROM comments WHERE status = 1"),
        )?;

        Ok(BoardStats {
            total_posts,
            active_posts,
            deleted_posts: total_posts - active_posts,
            notices,
            recommended,
            total_comments,
            active_comments,
            deleted_comments: total_comments - active_comments,
        })
    }

    async fn count(&self, sql: &'static str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.db.pool).await?;
        Ok(count)
    }
}
