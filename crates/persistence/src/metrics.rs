//! Store query metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records how long one named store query took.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("store_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Publishes connection pool gauges. Called periodically by the pool job.
pub fn record_pool_metrics(pool: &PgPool) -> PoolSnapshot {
    let snapshot = PoolSnapshot {
        size: pool.size(),
        idle: pool.num_idle(),
    };

    gauge!("store_connections_active").set(snapshot.active() as f64);
    gauge!("store_connections_idle").set(snapshot.idle as f64);
    gauge!("store_connections_total").set(snapshot.size as f64);
    snapshot
}

/// Pool utilization at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub size: u32,
    pub idle: usize,
}

impl PoolSnapshot {
    pub fn active(&self) -> usize {
        (self.size as usize).saturating_sub(self.idle)
    }
}

/// Times a query from construction until [`QueryTimer::record`].
///
/// ```ignore
/// let timer = QueryTimer::new("find_venue_by_id");
/// let result = sqlx::query_as::<_, VenueEntity>(sql).bind(id).fetch_optional(conn).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("list_venues");
        assert_eq!(timer.query_name, "list_venues");
    }

    #[test]
    fn test_pool_snapshot_active() {
        assert_eq!(PoolSnapshot { size: 10, idle: 4 }.active(), 6);
        assert_eq!(PoolSnapshot { size: 2, idle: 5 }.active(), 0);
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        QueryTimer::new("count_chat_messages").record();
    }
}
