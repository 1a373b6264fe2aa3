//! Persistence interface for flushed prediction batches.

pub mod error;
pub mod prediction;
pub mod retry;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use prediction::PredictionRepository;
pub use retry::RetryPolicy;
