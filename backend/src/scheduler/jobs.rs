//! The two recurring jobs: refresh cached results, and predict.

use async_trait::async_trait;
use std::sync::Arc;

use super::Job;
use crate::db::PredictionRepository;
use crate::models::{BatchSummary, WeeklyBatch};
use crate::services::PredictionPipeline;

/// Re-scrapes results into the cache.
pub struct ScrapeJob {
    pipeline: Arc<PredictionPipeline>,
}

impl ScrapeJob {
    pub fn new(pipeline: Arc<PredictionPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Job for ScrapeJob {
    fn name(&self) -> &str {
        "scrape"
    }

    async fn run(&mut self) {
        if let Err(e) = self.pipeline.refresh_results().await {
            log::error!("Scheduled scrape failed: {}", e);
        }
    }
}

/// Runs the prediction pipeline and accumulates successful predictions.
///
/// When the batch fills up it is written to the repository in one call and
/// then cleared, whether or not the write succeeded. The summary email is
/// only sent after a successful write.
pub struct PredictionJob {
    pipeline: Arc<PredictionPipeline>,
    repository: Arc<dyn PredictionRepository>,
    batch: WeeklyBatch,
}

impl PredictionJob {
    pub fn new(
        pipeline: Arc<PredictionPipeline>,
        repository: Arc<dyn PredictionRepository>,
        batch_size: usize,
    ) -> Self {
        Self {
            pipeline,
            repository,
            batch: WeeklyBatch::new(batch_size),
        }
    }

    pub fn batch(&self) -> &WeeklyBatch {
        &self.batch
    }

    /// One tick: predict, append, flush if full.
    pub async fn tick(&mut self) {
        match self.pipeline.run().await {
            Ok(prediction) => {
                if self.batch.push(prediction) {
                    self.flush().await;
                } else {
                    log::info!(
                        "Prediction batch at {}/{}",
                        self.batch.len(),
                        self.batch.capacity()
                    );
                }
            }
            Err(e) => log::error!("Scheduled prediction failed: {}", e),
        }
    }

    async fn flush(&mut self) {
        let entries = self.batch.flush_and_clear();
        match self.repository.insert_many(&entries).await {
            Ok(stored) => {
                log::info!("Stored weekly batch of {} predictions", stored);
                let summary = BatchSummary::from_predictions(&entries);
                if let Err(e) = self.pipeline.send_summary(&summary).await {
                    log::error!("Weekly summary email failed: {}", e);
                }
            }
            Err(e) => log::error!(
                "Failed to store weekly batch of {} predictions after {} attempt(s), discarding: {}",
                entries.len(),
                e.context().attempts.unwrap_or(1),
                e
            ),
        }
    }
}

#[async_trait]
impl Job for PredictionJob {
    fn name(&self) -> &str {
        "prediction"
    }

    async fn run(&mut self) {
        self.tick().await;
    }
}
