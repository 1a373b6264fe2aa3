//! Repository factory for dependency injection.
//!
//! Chooses and builds the persistence backend from [`AppConfig`].

use std::str::FromStr;
use std::sync::Arc;

use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::{PostgresConfig, PostgresRepository};
use super::repository::{PredictionRepository, RepositoryError, RepositoryResult};
use crate::config::AppConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Accepts `"postgres"`, `"pg"` and `"local"`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Build the repository selected by `config.repository`.
    pub async fn from_config(config: &AppConfig) -> RepositoryResult<Arc<dyn PredictionRepository>> {
        let repo_type = config
            .repository_type()
            .map_err(|e| RepositoryError::configuration(e.to_string()))?;

        match repo_type {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let pg_config = PostgresConfig::from_settings(&config.postgres);
                    let pg = Self::create_postgres(pg_config).await?;
                    Ok(pg as Arc<dyn PredictionRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Postgres repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a Postgres repository. Pool setup and migrations block, so they
    /// run on the blocking thread pool.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(config: PostgresConfig) -> RepositoryResult<Arc<PostgresRepository>> {
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    pub fn create_local() -> Arc<dyn PredictionRepository> {
        Arc::new(LocalRepository::new())
    }
}
