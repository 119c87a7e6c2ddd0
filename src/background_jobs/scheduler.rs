use super::context::JobContext;
use super::job::{BackgroundJob, HookEvent, JobError, ShutdownBehavior};
use crate::server::metrics;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Upper bound on how long the scheduler sleeps between checks.
const MAX_SLEEP: Duration = Duration::from_secs(60);

/// Manages background job scheduling and execution.
pub struct JobScheduler {
    jobs: HashMap<String, Arc<dyn BackgroundJob>>,

    /// Next due time of interval-scheduled jobs.
    next_runs: HashMap<String, Instant>,

    /// Ids of jobs currently executing, updated by the job tasks themselves.
    running_jobs: Arc<RwLock<HashSet<String>>>,

    running_handles: HashMap<String, JoinHandle<()>>,

    job_cancel_tokens: HashMap<String, CancellationToken>,

    shutdown_token: CancellationToken,

    job_context: JobContext,
}

impl JobScheduler {
    pub fn new(shutdown_token: CancellationToken, job_context: JobContext) -> Self {
        Self {
            jobs: HashMap::new(),
            next_runs: HashMap::new(),
            running_jobs: Arc::new(RwLock::new(HashSet::new())),
            running_handles: HashMap::new(),
            job_cancel_tokens: HashMap::new(),
            shutdown_token,
            job_context,
        }
    }

    /// Register a job with the scheduler.
    ///
    /// Interval jobs are due immediately unless a startup hook runs them first.
    pub fn register_job(&mut self, job: Arc<dyn BackgroundJob>) {
        let job_id = job.id().to_string();
        info!("Registering job: {} - {}", job_id, job.description());
        if job.schedule().interval().is_some() {
            self.next_runs.insert(job_id.clone(), Instant::now());
        }
        self.jobs.insert(job_id, job);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub async fn is_job_running(&self, job_id: &str) -> bool {
        self.running_jobs.read().await.contains(job_id)
    }

    /// Main scheduler loop. Returns once the shutdown token is cancelled.
    pub async fn run(&mut self) {
        info!("Starting job scheduler with {} registered jobs", self.job_count());

        self.trigger_jobs_for_hook(HookEvent::OnStartup).await;

        loop {
            self.cleanup_completed_jobs().await;

            let sleep_duration = self.time_until_next_scheduled_job();
            debug!(
                "Scheduler sleeping for {:?} until next scheduled job",
                sleep_duration
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.run_due_jobs().await;
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Scheduler received shutdown signal");
                    self.shutdown().await;
                    break;
                }
            }
        }

        info!("Job scheduler stopped");
    }

    fn time_until_next_scheduled_job(&self) -> Duration {
        let now = Instant::now();
        self.next_runs
            .values()
            .map(|next_run| next_run.saturating_duration_since(now))
            .min()
            .unwrap_or(MAX_SLEEP)
            .min(MAX_SLEEP)
    }

    async fn run_due_jobs(&mut self) {
        let now = Instant::now();
        let due: Vec<String> = self
            .next_runs
            .iter()
            .filter(|(_, next_run)| **next_run <= now)
            .map(|(job_id, _)| job_id.clone())
            .collect();

        for job_id in due {
            if self.is_job_running(&job_id).await {
                debug!("Job {} is still running, skipping this interval", job_id);
                self.reschedule(&job_id);
                continue;
            }
            self.spawn_job(&job_id, "schedule").await;
        }
    }

    async fn trigger_jobs_for_hook(&mut self, event: HookEvent) {
        let to_trigger: Vec<String> = self
            .jobs
            .iter()
            .filter(|(_, job)| job.schedule().listens_to(event))
            .map(|(job_id, _)| job_id.clone())
            .collect();

        for job_id in to_trigger {
            if self.is_job_running(&job_id).await {
                debug!("Skipping hook trigger for already running job: {}", job_id);
                continue;
            }
            let trigger = format!("hook:{}", event);
            self.spawn_job(&job_id, &trigger).await;
        }
    }

    fn reschedule(&mut self, job_id: &str) {
        let interval = self
            .jobs
            .get(job_id)
            .and_then(|job| job.schedule().interval());
        let Some(interval) = interval else {
            return;
        };
        match Instant::now().checked_add(interval) {
            Some(next_run) => {
                self.next_runs.insert(job_id.to_string(), next_run);
            }
            None => {
                warn!("Interval of job {} is out of range, not rescheduling", job_id);
                self.next_runs.remove(job_id);
            }
        }
    }

    async fn spawn_job(&mut self, job_id: &str, triggered_by: &str) {
        let Some(job) = self.jobs.get(job_id).cloned() else {
            error!("Attempted to spawn unknown job: {}", job_id);
            return;
        };

        info!("Starting job: {} (triggered_by: {})", job_id, triggered_by);

        self.running_jobs.write().await.insert(job_id.to_string());
        self.reschedule(job_id);
        metrics::set_background_job_running(job_id, true);

        let cancel_token = self.job_context.cancellation_token.child_token();
        self.job_cancel_tokens
            .insert(job_id.to_string(), cancel_token.clone());
        let ctx = JobContext::new(
            cancel_token,
            Arc::clone(&self.job_context.catalog_store),
            Arc::clone(&self.job_context.notifier),
        );

        let job_id_owned = job_id.to_string();
        let running_jobs = Arc::clone(&self.running_jobs);

        let handle = tokio::spawn(async move {
            let start_time = Instant::now();
            let result = tokio::task::spawn_blocking(move || job.execute(&ctx)).await;
            let elapsed = start_time.elapsed();

            let status_label = match result {
                Ok(Ok(())) => {
                    info!("Job {} completed successfully in {:?}", job_id_owned, elapsed);
                    "success"
                }
                Ok(Err(JobError::Cancelled)) => {
                    info!("Job {} was cancelled after {:?}", job_id_owned, elapsed);
                    "cancelled"
                }
                Ok(Err(e)) => {
                    error!("Job {} failed after {:?}: {}", job_id_owned, elapsed, e);
                    "failed"
                }
                Err(e) => {
                    error!("Job {} panicked after {:?}: {}", job_id_owned, elapsed, e);
                    "panic"
                }
            };

            metrics::record_background_job_execution(&job_id_owned, status_label, elapsed);
            metrics::set_background_job_running(&job_id_owned, false);
            running_jobs.write().await.remove(&job_id_owned);
        });

        self.running_handles.insert(job_id.to_string(), handle);
    }

    async fn cleanup_completed_jobs(&mut self) {
        let completed: Vec<String> = self
            .running_handles
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(job_id, _)| job_id.clone())
            .collect();

        for job_id in completed {
            if let Some(handle) = self.running_handles.remove(&job_id) {
                let _ = handle.await;
            }
            self.job_cancel_tokens.remove(&job_id);
        }
    }

    async fn shutdown(&mut self) {
        info!("Shutting down scheduler...");

        for (job_id, token) in &self.job_cancel_tokens {
            let behavior = self
                .jobs
                .get(job_id)
                .map(|job| job.shutdown_behavior())
                .unwrap_or_default();
            if behavior == ShutdownBehavior::Cancellable {
                debug!("Cancelling job: {}", job_id);
                token.cancel();
            }
        }

        for (job_id, handle) in self.running_handles.drain() {
            debug!("Waiting for job {} to stop", job_id);
            let _ = tokio::time::timeout(Duration::from_secs(30), handle).await;
        }

        self.job_cancel_tokens.clear();
        info!("Scheduler shutdown complete");
    }
}
