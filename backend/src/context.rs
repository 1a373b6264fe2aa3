//! Startup wiring.
//!
//! [`AppContext`] builds every collaborator once from [`AppConfig`] and hands
//! them out as shared trait objects. Nothing in the crate reaches for a
//! global.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, LocalCache};
use crate::config::{AppConfig, ConfigError};
use crate::db::{PredictionRepository, RepositoryError, RepositoryFactory};
use crate::models::DrawScheduleTable;
use crate::notify::{LocalNotifier, Notifier, NotifierType, NotifyError, RelayNotifier};
use crate::scheduler::{Clock, PredictionJob, ScrapeJob, Scheduler, SystemClock, Trigger};
use crate::scrape::{HttpPageSource, PageSource, ResultScraper};
use crate::services::{Evaluator, PredictionPipeline, Predictor};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Repository initialization failed: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Notifier initialization failed: {0}")]
    Notifier(#[from] NotifyError),
}

/// The collaborators the running service needs, swappable for tests.
pub struct Components {
    pub clock: Arc<dyn Clock>,
    pub cache: Arc<dyn CacheStore>,
    pub notifier: Arc<dyn Notifier>,
    pub repository: Arc<dyn PredictionRepository>,
    pub source: Arc<dyn PageSource>,
}

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub clock: Arc<dyn Clock>,
    pub repository: Arc<dyn PredictionRepository>,
    pub pipeline: Arc<PredictionPipeline>,
}

impl AppContext {
    /// Build production collaborators from configuration.
    pub async fn from_config(config: AppConfig) -> Result<Self, ContextError> {
        config.validate()?;

        let repository = RepositoryFactory::from_config(&config).await?;
        let notifier: Arc<dyn Notifier> = match config.notifier.notifier_type {
            NotifierType::Local => Arc::new(LocalNotifier::new()),
            NotifierType::Relay => Arc::new(RelayNotifier::from_config(&config.notifier)?),
        };
        log::info!(
            "Notifier: {:?}, recipient {}",
            config.notifier.notifier_type,
            config.notifier.recipient
        );

        let components = Components {
            clock: Arc::new(SystemClock),
            cache: Arc::new(LocalCache::new()),
            notifier,
            repository,
            source: Arc::new(HttpPageSource::new(&config.scraper)),
        };
        Ok(Self::from_parts(config, components))
    }

    /// Assemble a context around caller-supplied collaborators.
    pub fn from_parts(config: AppConfig, components: Components) -> Self {
        let scraper = ResultScraper::new(components.source, config.scraper.pages);
        let evaluator = Evaluator::new(config.evaluation.order, config.evaluation.train_ratio);
        let pipeline = PredictionPipeline::new(
            scraper,
            Predictor::new(DrawScheduleTable::standard()),
            evaluator,
            components.cache,
            components.notifier,
            components.clock.clone(),
            config.notifier.recipient.clone(),
            Duration::from_secs(config.cache.ttl_secs),
        );

        Self {
            config,
            clock: components.clock,
            repository: components.repository,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Start the scrape and prediction jobs.
    pub fn start_scheduler(&self) -> Result<Scheduler, ContextError> {
        let schedule = &self.config.schedule;
        let mut scheduler = Scheduler::new(self.clock.clone());
        scheduler.spawn(
            Trigger::daily(schedule.scrape_times()?),
            ScrapeJob::new(self.pipeline.clone()),
        );
        scheduler.spawn(
            Trigger::daily(schedule.prediction_times()?),
            PredictionJob::new(
                self.pipeline.clone(),
                self.repository.clone(),
                schedule.batch_size,
            ),
        );
        Ok(scheduler)
    }

    /// Run the pipeline once in the background, logging the outcome.
    pub fn spawn_startup_run(&self) -> tokio::task::JoinHandle<()> {
        let pipeline = self.pipeline.clone();
        tokio::spawn(async move {
            match pipeline.run().await {
                Ok(prediction) => log::info!(
                    "Startup prediction for {}: {:?}",
                    prediction.draw,
                    prediction.predicted_numbers
                ),
                Err(e) => log::error!("Startup prediction failed: {}", e),
            }
        })
    }
}
