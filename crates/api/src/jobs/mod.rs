//! Background job scheduler and job implementations.

mod expire_action_items;
mod pool_metrics;
mod scheduler;

pub use expire_action_items::ExpireActionItemsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobError, JobOutcome, JobScheduler};
