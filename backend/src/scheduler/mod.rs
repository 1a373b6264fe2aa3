//! Background job scheduling.
//!
//! A [`Scheduler`] runs each registered [`Job`] in its own tokio task. The
//! task asks its [`Trigger`] for the next wall-clock fire time (read from a
//! [`Clock`]), sleeps on tokio's monotonic timer until then and runs the job
//! to completion before computing the next fire time, so a job never overlaps
//! itself. Cancellation only interrupts the sleep: a run that has started
//! always finishes.

pub mod clock;
pub mod jobs;
pub mod trigger;

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use clock::{Clock, FakeClock, SystemClock};
pub use jobs::{PredictionJob, ScrapeJob};
pub use trigger::Trigger;

/// A unit of recurring background work.
#[async_trait]
pub trait Job: Send + 'static {
    fn name(&self) -> &str;

    /// Run once. Failures are handled (logged) inside the job.
    async fn run(&mut self);
}

pub struct Scheduler {
    clock: Arc<dyn Clock>,
    token: CancellationToken,
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            token: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Start `job` on `trigger` in a new task.
    pub fn spawn<J: Job>(&mut self, trigger: Trigger, mut job: J) {
        let name = job.name().to_string();
        let clock = self.clock.clone();
        let token = self.token.child_token();
        log::info!("Scheduling job '{}' {}", name, trigger);

        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Some(delay) = trigger.delay_from(clock.as_ref()) else {
                    log::warn!("Job '{}' has no future fire time, stopping", task_name);
                    break;
                };

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }

                log::debug!("Running job '{}'", task_name);
                job.run().await;

                if token.is_cancelled() {
                    break;
                }
            }
            log::info!("Job '{}' stopped", task_name);
        });
        self.tasks.push((name, handle));
    }

    /// Cancel every future tick. Returns immediately.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn job_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Cancel future ticks and wait for in-flight runs to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        let (names, handles): (Vec<String>, Vec<JoinHandle<()>>) = self.tasks.drain(..).unzip();
        for (name, result) in names.iter().zip(join_all(handles).await) {
            if let Err(e) = result {
                log::error!("Job '{}' task ended abnormally: {}", name, e);
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
