//! Response and query types for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::models::{RawDrawResult, StoredPrediction};

/// Default and maximum page sizes for `GET /api/predictions`.
pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub count: usize,
    pub results: Vec<RawDrawResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn limit(&self) -> Result<usize, String> {
        match self.limit {
            None => Ok(DEFAULT_LIST_LIMIT),
            Some(0) => Err("limit must be at least 1".to_string()),
            Some(n) => Ok(n.min(MAX_LIST_LIMIT)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionListResponse {
    pub predictions: Vec<StoredPrediction>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_limit() {
        assert_eq!(ListQuery { limit: None }.limit(), Ok(DEFAULT_LIST_LIMIT));
        assert_eq!(ListQuery { limit: Some(5) }.limit(), Ok(5));
        assert_eq!(ListQuery { limit: Some(10_000) }.limit(), Ok(MAX_LIST_LIMIT));
        assert!(ListQuery { limit: Some(0) }.limit().is_err());
    }
}
