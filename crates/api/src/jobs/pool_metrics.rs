//! Background job to record connection pool metrics.

use std::time::Duration;

use sqlx::PgPool;

use super::scheduler::{Job, JobError, JobOutcome};

const SAMPLE_PERIOD: Duration = Duration::from_secs(10);

/// Samples PostgreSQL pool utilization into gauges.
pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn period(&self) -> Duration {
        SAMPLE_PERIOD
    }

    async fn run(&self) -> Result<JobOutcome, JobError> {
        let snapshot = persistence::metrics::record_pool_metrics(&self.pool);
        Ok(JobOutcome::PoolSampled {
            size: snapshot.size,
            idle: snapshot.idle,
        })
    }
}
