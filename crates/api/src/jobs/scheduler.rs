//! Periodic runner for background jobs.
//!
//! Each job runs on its own task, first after one full period. A run's
//! [`JobOutcome`] is reported here so jobs stay free of logging and metrics.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use domain::DomainError;

use crate::middleware::metrics::{record_action_items_expired, record_job_run};

/// What a single job run accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Number of action items moved to `expired`.
    Expired(u64),
    /// Pool gauges were refreshed.
    PoolSampled { size: u32, idle: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[async_trait::async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    /// Delay between runs.
    fn period(&self) -> Duration;

    async fn run(&self) -> Result<JobOutcome, JobError>;
}

/// Owns the job tasks and their shutdown signal.
pub struct JobScheduler {
    tasks: JoinSet<()>,
    shutdown: watch::Sender<bool>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            tasks: JoinSet::new(),
            shutdown,
        }
    }

    /// Starts `job` on its own task.
    pub fn spawn<J: Job + 'static>(&mut self, job: J) {
        let job: Arc<dyn Job> = Arc::new(job);
        info!(
            job = job.name(),
            period_secs = job.period().as_secs(),
            "Job scheduled"
        );
        self.tasks
            .spawn(run_periodically(job, self.shutdown.subscribe()));
    }

    pub fn job_count(&self) -> usize {
        self.tasks.len()
    }

    /// Signals every job to stop and waits up to `grace` for in-flight runs.
    /// Jobs still running after that are aborted.
    pub async fn shutdown(mut self, grace: Duration) {
        info!(jobs = self.tasks.len(), "Stopping background jobs");
        let _ = self.shutdown.send(true);

        let drain = async {
            while let Some(joined) = self.tasks.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "Job task panicked");
                }
            }
        };
        if tokio::time::timeout(grace, drain).await.is_err() {
            warn!(grace_secs = grace.as_secs(), "Jobs did not stop in time, aborting");
            self.tasks.abort_all();
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_periodically(job: Arc<dyn Job>, mut shutdown: watch::Receiver<bool>) {
    let period = job.period();
    let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticks.tick() => run_once(job.as_ref()).await,
            // a dropped sender also stops the job
            _ = shutdown.changed() => break,
        }
    }
    debug!(job = job.name(), "Job stopped");
}

async fn run_once(job: &dyn Job) {
    let name = job.name();
    let started = Instant::now();
    let result = job.run().await;
    let elapsed = started.elapsed();
    record_job_run(name, result.is_ok(), elapsed.as_secs_f64());

    match result {
        Ok(outcome) => report(name, outcome, elapsed),
        Err(e) => error!(
            job = name,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %e,
            "Job failed"
        ),
    }
}

fn report(name: &'static str, outcome: JobOutcome, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match outcome {
        JobOutcome::Expired(0) => debug!(job = name, elapsed_ms, "No action items to expire"),
        JobOutcome::Expired(count) => {
            record_action_items_expired(count);
            info!(job = name, expired = count, elapsed_ms, "Expired stale action items");
        }
        JobOutcome::PoolSampled { size, idle } => {
            debug!(job = name, size, idle, elapsed_ms, "Sampled connection pool")
        }
    }
}
