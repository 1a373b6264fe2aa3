//! The scrape, predict, evaluate and notify run.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{
    cache_json, get_json, CacheError, CacheStore, LATEST_PREDICTION_KEY, LATEST_RESULTS_KEY,
};
use crate::models::{BatchSummary, Prediction, RawDrawResult};
use crate::notify::{EmailMessage, Notifier, NotifyError};
use crate::scheduler::Clock;
use crate::scrape::ResultScraper;

use super::evaluator::Evaluator;
use super::predictor::Predictor;
use super::preprocess::preprocess;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Shared collaborators of one pipeline.
pub struct PredictionPipeline {
    scraper: ResultScraper,
    predictor: Predictor,
    evaluator: Evaluator,
    cache: Arc<dyn CacheStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    recipient: String,
    cache_ttl: Duration,
}

impl PredictionPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scraper: ResultScraper,
        predictor: Predictor,
        evaluator: Evaluator,
        cache: Arc<dyn CacheStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        recipient: impl Into<String>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            scraper,
            predictor,
            evaluator,
            cache,
            notifier,
            clock,
            recipient: recipient.into(),
            cache_ttl,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Scrape fresh results and store them under `latestResults`.
    pub async fn refresh_results(&self) -> Result<Vec<RawDrawResult>, PipelineError> {
        let results = self.scraper.scrape().await;
        self.store_results(&results).await?;
        Ok(results)
    }

    /// Scrape fresh results for a caller that only wants the rows. Caching
    /// them is best effort: a failed write is logged and the rows are still
    /// returned.
    pub async fn scrape_results(&self) -> Vec<RawDrawResult> {
        let results = self.scraper.scrape().await;
        if let Err(e) = self.store_results(&results).await {
            log::warn!("Scraped {} results but could not cache them: {}", results.len(), e);
        }
        results
    }

    async fn store_results(&self, results: &[RawDrawResult]) -> Result<(), CacheError> {
        cache_json(self.cache.as_ref(), LATEST_RESULTS_KEY, results, self.cache_ttl).await?;
        log::info!("Cached {} draw results", results.len());
        Ok(())
    }

    /// Full run: refresh results, predict the active draw, backtest, cache
    /// the prediction and email it.
    ///
    /// The prediction is only returned once it has been cached and sent.
    pub async fn run(&self) -> Result<Prediction, PipelineError> {
        let results = self.refresh_results().await?;
        let records = preprocess(&results);

        let mut prediction = self.predictor.predict(&records, self.clock.now());
        prediction.accuracy = self.evaluator.evaluate(&records, &prediction);
        log::info!(
            "Prediction for {}: {:?} ({:.2}% backtested)",
            prediction.draw,
            prediction.predicted_numbers,
            prediction.accuracy
        );

        cache_json(
            self.cache.as_ref(),
            LATEST_PREDICTION_KEY,
            &prediction,
            self.cache_ttl,
        )
        .await?;
        self.notifier
            .send(EmailMessage::for_prediction(&self.recipient, &prediction))
            .await?;

        Ok(prediction)
    }

    /// Email the roll-up of a flushed batch, dated today.
    pub async fn send_summary(&self, summary: &BatchSummary) -> Result<(), PipelineError> {
        let date = self.clock.now().date().format("%Y-%m-%d").to_string();
        self.notifier
            .send(EmailMessage::weekly_summary(&self.recipient, date, summary))
            .await?;
        Ok(())
    }

    /// The cached `latestPrediction`, if still live.
    pub async fn latest_prediction(&self) -> Result<Option<Prediction>, PipelineError> {
        Ok(get_json(self.cache.as_ref(), LATEST_PREDICTION_KEY).await?)
    }

    pub async fn latest_results(&self) -> Result<Option<Vec<RawDrawResult>>, PipelineError> {
        Ok(get_json(self.cache.as_ref(), LATEST_RESULTS_KEY).await?)
    }
}
