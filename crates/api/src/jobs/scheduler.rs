//! Interval scheduler for background jobs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A unit of background work.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Time between runs.
    fn interval(&self) -> Duration;

    /// Runs the job once. Errors are logged by the scheduler.
    async fn execute(&self) -> Result<(), String>;
}

/// Runs a job once, logging and counting the outcome.
pub async fn run_job(job: &dyn Job) -> bool {
    let name = job.name();
    let start = Instant::now();

    let result = job.execute().await;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let status = if result.is_ok() { "success" } else { "error" };
    metrics::counter!("background_job_runs_total", "job" => name, "status" => status).increment(1);

    match result {
        Ok(()) => {
            info!(job = name, elapsed_ms = elapsed_ms, "Job completed");
            true
        }
        Err(e) => {
            error!(job = name, elapsed_ms = elapsed_ms, error = %e, "Job failed");
            false
        }
    }
}

/// Runs registered jobs on their intervals until shutdown.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Spawns one task per job. The first run happens after one interval.
    pub fn start(&mut self) {
        info!(jobs = self.jobs.len(), "Starting job scheduler");

        for job in &self.jobs {
            let job = Arc::clone(job);
            let mut shutdown_rx = self.shutdown_tx.subscribe();

            self.handles.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(job.interval());
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                interval.tick().await;

                info!(job = job.name(), interval = ?job.interval(), "Job scheduled");

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            run_job(job.as_ref()).await;
                        }
                        changed = shutdown_rx.changed() => {
                            if changed.is_err() || *shutdown_rx.borrow() {
                                info!(job = job.name(), "Job shutting down");
                                break;
                            }
                        }
                    }
                }
            }));
        }
    }

    /// Signals every job task to stop.
    pub fn shutdown(&self) {
        info!("Initiating job scheduler shutdown");
        let _ = self.shutdown_tx.send(true);
    }

    /// Waits for job tasks to finish, giving up after `timeout`.
    pub async fn wait_for_shutdown(self, timeout: Duration) {
        let handles = self.handles;
        let join_all = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Job task panicked");
                }
            }
        };

        match tokio::time::timeout(timeout, join_all).await {
            Ok(()) => info!("All jobs stopped"),
            Err(_) => warn!(timeout = ?timeout, "Job shutdown timed out"),
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}
