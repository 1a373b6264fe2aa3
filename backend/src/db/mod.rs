//! Persistence for flushed prediction batches.
//!
//! - `repository`: the [`PredictionRepository`] trait and its error type
//! - `repositories::local`: in-memory implementation
//! - `repositories::postgres`: Postgres implementation with Diesel ORM
//! - `factory`: picks the backend from configuration
//!
//! The repository is built once at startup and handed to its users as
//! `Arc<dyn PredictionRepository>`.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository};
pub use repository::{
    ErrorContext, PredictionRepository, RepositoryError, RepositoryResult, RetryPolicy,
};
