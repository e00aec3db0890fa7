//! Background job that expires stale action items.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use domain::services::ActionItemCoordinator;

use super::scheduler::{Job, JobError, JobOutcome};
use crate::config::CoordinationConfig;

/// Moves active action items past `expires_at` to `expired`.
pub struct ExpireActionItemsJob {
    coordinator: Arc<ActionItemCoordinator>,
    period: Duration,
}

impl ExpireActionItemsJob {
    /// Sweep job at `coordination.expire_sweep_minutes`, or `None` when the
    /// sweep is disabled.
    pub fn from_config(
        coordinator: Arc<ActionItemCoordinator>,
        config: &CoordinationConfig,
    ) -> Option<Self> {
        match config.expire_sweep_minutes {
            0 => None,
            minutes => Some(Self {
                coordinator,
                period: Duration::from_secs(minutes.saturating_mul(60)),
            }),
        }
    }
}

#[async_trait::async_trait]
impl Job for ExpireActionItemsJob {
    fn name(&self) -> &'static str {
        "expire_action_items"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn run(&self) -> Result<JobOutcome, JobError> {
        let expired = self.coordinator.expire(Utc::now()).await?;
        Ok(JobOutcome::Expired(expired))
    }
}
