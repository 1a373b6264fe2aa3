//! Application state for the HTTP server.

use std::sync::Arc;

use crate::context::AppContext;
use crate::db::PredictionRepository;
use crate::services::PredictionPipeline;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    pub repository: Arc<dyn PredictionRepository>,
}

impl AppState {
    pub fn new(pipeline: Arc<PredictionPipeline>, repository: Arc<dyn PredictionRepository>) -> Self {
        Self {
            pipeline,
            repository,
        }
    }

    pub fn from_context(context: &AppContext) -> Self {
        Self::new(context.pipeline.clone(), context.repository.clone())
    }
}
