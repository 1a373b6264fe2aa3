//! In-memory prediction repository.
//!
//! Suitable for local development and tests: data lives for the lifetime of
//! the process, and health can be toggled to exercise failure paths.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::db::repository::{PredictionRepository, RepositoryError, RepositoryResult};
use crate::models::{Prediction, PredictionId, StoredPrediction};

#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    predictions: Vec<StoredPrediction>,
    next_id: i64,
    insert_calls: usize,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            predictions: Vec::new(),
            next_id: 1,
            insert_calls: 0,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures. While
    /// unhealthy every operation fails with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Number of `insert_many` calls received, including failed ones.
    pub fn insert_calls(&self) -> usize {
        self.data.read().insert_calls
    }

    /// Every stored prediction, oldest first.
    pub fn all(&self) -> Vec<StoredPrediction> {
        self.data.read().predictions.clone()
    }

    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    fn ensure_healthy(data: &LocalData, operation: &str) -> RepositoryResult<()> {
        if data.is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection("local repository is marked unhealthy")
                .in_operation(operation))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PredictionRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_many(&self, predictions: &[Prediction]) -> RepositoryResult<usize> {
        let mut data = self.data.write();
        data.insert_calls += 1;
        Self::ensure_healthy(&data, "insert_many")?;

        let created_at = Utc::now();
        for prediction in predictions {
            let id = PredictionId::new(data.next_id);
            data.next_id += 1;
            data.predictions.push(StoredPrediction {
                id,
                prediction: prediction.clone(),
                created_at,
            });
        }
        Ok(predictions.len())
    }

    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<StoredPrediction>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "list_recent")?;
        Ok(data.predictions.iter().rev().take(limit).cloned().collect())
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "count")?;
        Ok(data.predictions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(draw: &str) -> Prediction {
        Prediction {
            date: "2024-01-01".to_string(),
            draw: draw.to_string(),
            predicted_numbers: vec![1, 2, 3, 4, 5],
            accuracy: 20.0,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let repo = LocalRepository::new();
        let inserted = repo
            .insert_many(&[prediction("A"), prediction("B"), prediction("C")])
            .await
            .unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(repo.count().await.unwrap(), 3);

        let recent = repo.list_recent(2).await.unwrap();
        let draws: Vec<&str> = recent.iter().map(|p| p.prediction.draw.as_str()).collect();
        assert_eq!(draws, vec!["C", "B"]);
        assert_eq!(recent[0].id.value(), 3);
    }

    #[tokio::test]
    async fn test_unhealthy_rejects_writes() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());

        let err = repo.insert_many(&[prediction("A")]).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(repo.insert_calls(), 1);

        repo.set_healthy(true);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_keeps_health() {
        let repo = LocalRepository::new();
        repo.insert_many(&[prediction("A")]).await.unwrap();
        repo.set_healthy(false);
        repo.clear();
        assert!(!repo.health_check().await.unwrap());
        repo.set_healthy(true);
        assert!(repo.all().is_empty());
    }
}
