//! Recommended-feed promotion job
//!
//! Every `interval_secs` it scans recent posts and promotes the ones that
//! crossed the view or like threshold. A failed scan is logged and the next
//! tick tries again.
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::services::PromotionService;

pub struct PromotionJob {
    service: PromotionService,
    interval_secs: u64,
}

impl PromotionJob {
    pub fn new(service: PromotionService) -> Self {
        let interval_secs = service.rule().interval_secs.max(1);
        Self {
            service,
            interval_secs,
        }
    }

    /// Spawns the loop. It exits when `shutdown` fires or its sender is dropped.
    pub fn start(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(self.interval_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let rule = self.service.rule();
            info!(
                interval_secs = self.interval_secs,
                window_hours = rule.window_hours,
                min_views = rule.min_views,
                min_likes = rule.min_likes,
                "Starting promotion job"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.run_once().await,
                    _ = shutdown.recv() => {
                        info!("Promotion job stopped");
                        break;
                    }
                }
            }
        })
    }

    async fn run_once(&self) {
        match self.service.promote_eligible(Utc::now().naive_utc()).await {
            Ok(0) => debug!("No posts to promote"),
            Ok(promoted) => info!(promoted, "Promoted posts to the recommended feed"),
            Err(e) => error!("Promotion scan failed: {}", e),
        }
    }
}
