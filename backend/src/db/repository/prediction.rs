use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Prediction, StoredPrediction};

/// Durable store for weekly prediction batches.
///
/// Implementations must be `Send + Sync`; they are shared as
/// `Arc<dyn PredictionRepository>` between the prediction job and the HTTP
/// handlers.
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert every prediction in one write. Returns the number of rows
    /// inserted; either all of them land or none do.
    async fn insert_many(&self, predictions: &[Prediction]) -> RepositoryResult<usize>;

    /// Most recently stored predictions, newest first.
    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<StoredPrediction>>;

    async fn count(&self) -> RepositoryResult<usize>;
}
