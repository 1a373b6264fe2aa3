//! Service configuration.
//!
//! Settings are read from a TOML file (every field has a default, so the file
//! may be partial or missing entirely) and then overridden by environment
//! variables.
//!
//! ```toml
//! [server]
//! port = 3000
//!
//! [scraper]
//! base_url = "https://www.590mobile.com.gh/results"
//! pages = 10
//!
//! [schedule]
//! scrape_every_hours = 6
//! prediction_times = ["06:00", "13:00"]
//!
//! [notifier]
//! type = "relay"
//! recipient = "someone@example.com"
//! relay_url = "http://localhost:8025/send"
//!
//! [repository]
//! type = "local"
//! ```

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cache::ONE_WEEK_SECS;
use crate::db::factory::RepositoryType;
use crate::models::DEFAULT_BATCH_SIZE;
use crate::notify::NotifierType;
use crate::scrape::DEFAULT_PAGE_COUNT;
use crate::services::evaluator::{EvaluationOrder, DEFAULT_TRAIN_RATIO};

/// Name of the configuration file searched for by [`AppConfig::load`].
pub const CONFIG_FILE_NAME: &str = "draw-oracle.toml";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
    pub schedule: ScheduleConfig,
    pub cache: CacheConfig,
    pub evaluation: EvaluationConfig,
    pub notifier: NotifierConfig,
    pub repository: RepositorySettings,
    pub postgres: PostgresSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    pub pages: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.590mobile.com.gh/results".to_string(),
            pages: DEFAULT_PAGE_COUNT,
            timeout_secs: 60,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) draw-oracle/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Period of the scrape job; must divide 24.
    pub scrape_every_hours: u32,
    /// Local wall-clock times (`HH:MM`) of the prediction job.
    pub prediction_times: Vec<String>,
    /// Predictions accumulated before the weekly flush.
    pub batch_size: usize,
    /// Run the prediction pipeline once at startup.
    pub run_on_startup: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            scrape_every_hours: 6,
            prediction_times: vec!["06:00".to_string(), "13:00".to_string()],
            batch_size: DEFAULT_BATCH_SIZE,
            run_on_startup: true,
        }
    }
}

impl ScheduleConfig {
    pub fn prediction_times(&self) -> Result<Vec<NaiveTime>, ConfigError> {
        self.prediction_times
            .iter()
            .map(|raw| {
                NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
                    ConfigError::Invalid(format!("prediction time '{raw}' is not HH:MM: {e}"))
                })
            })
            .collect()
    }

    /// Times of day at which the scrape job fires, starting at midnight.
    pub fn scrape_times(&self) -> Result<Vec<NaiveTime>, ConfigError> {
        let every = self.scrape_every_hours;
        if every == 0 || 24 % every != 0 {
            return Err(ConfigError::Invalid(format!(
                "scrape_every_hours must divide 24, got {every}"
            )));
        }
        Ok((0..24)
            .step_by(every as usize)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: ONE_WEEK_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub order: EvaluationOrder,
    pub train_ratio: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            order: EvaluationOrder::AsScraped,
            train_ratio: DEFAULT_TRAIN_RATIO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    #[serde(rename = "type")]
    pub notifier_type: NotifierType,
    pub recipient: String,
    pub sender: String,
    pub relay_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            notifier_type: NotifierType::Local,
            recipient: "operator@localhost".to_string(),
            sender: "draw-oracle@localhost".to_string(),
            relay_url: None,
            timeout_secs: 30,
        }
    }
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: "local".to_string(),
        }
    }
}

/// Postgres connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresSettings {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: 30,
            idle_timeout: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Search for the configuration file in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn find_default_file() -> Option<PathBuf> {
        [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// File (or defaults when none is found), then environment overrides,
    /// then validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_default_file() {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::info!("No {} found, using defaults", CONFIG_FILE_NAME);
                Self::default()
            }
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from process environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Variables
    /// - `HOST`, `PORT`
    /// - `SCRAPE_BASE_URL`, `SCRAPE_PAGES`
    /// - `EVALUATION_ORDER` (`as-scraped` | `chronological`)
    /// - `NOTIFIER_TYPE` (`local` | `relay`), `NOTIFY_RECIPIENT`, `MAIL_RELAY_URL`
    /// - `REPOSITORY_TYPE`; when unset, `DATABASE_URL` / `PG_DATABASE_URL`
    ///   selects Postgres
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT must be a port number, got '{port}'")))?;
        }
        if let Some(url) = lookup("SCRAPE_BASE_URL") {
            self.scraper.base_url = url;
        }
        if let Some(pages) = lookup("SCRAPE_PAGES") {
            self.scraper.pages = pages.parse().map_err(|_| {
                ConfigError::Invalid(format!("SCRAPE_PAGES must be a number, got '{pages}'"))
            })?;
        }
        if let Some(order) = lookup("EVALUATION_ORDER") {
            self.evaluation.order = EvaluationOrder::from_str(&order).map_err(ConfigError::Invalid)?;
        }
        if let Some(kind) = lookup("NOTIFIER_TYPE") {
            self.notifier.notifier_type = NotifierType::from_str(&kind).map_err(ConfigError::Invalid)?;
        }
        if let Some(recipient) = lookup("NOTIFY_RECIPIENT") {
            self.notifier.recipient = recipient;
        }
        if let Some(url) = lookup("MAIL_RELAY_URL") {
            self.notifier.relay_url = Some(url);
        }

        let database_url = lookup("DATABASE_URL").or_else(|| lookup("PG_DATABASE_URL"));
        if let Some(url) = &database_url {
            self.postgres.database_url = url.clone();
        }
        match lookup("REPOSITORY_TYPE") {
            Some(repo_type) => self.repository.repo_type = repo_type,
            None if database_url.is_some() => self.repository.repo_type = "postgres".to_string(),
            None => {}
        }
        Ok(())
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, ConfigError> {
        RepositoryType::from_str(&self.repository.repo_type).map_err(ConfigError::Invalid)
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scraper.pages == 0 {
            return Err(ConfigError::Invalid("scraper.pages must be at least 1".to_string()));
        }
        if self.schedule.batch_size == 0 {
            return Err(ConfigError::Invalid("schedule.batch_size must be at least 1".to_string()));
        }
        let ratio = self.evaluation.train_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "evaluation.train_ratio must be in (0, 1], got {ratio}"
            )));
        }
        self.schedule.prediction_times()?;
        self.schedule.scrape_times()?;
        let repo_type = self.repository_type()?;
        if repo_type == RepositoryType::Postgres && self.postgres.database_url.is_empty() {
            return Err(ConfigError::Invalid(
                "Postgres repository requires 'postgres.database_url' or DATABASE_URL".to_string(),
            ));
        }
        if self.notifier.notifier_type == NotifierType::Relay && self.notifier.relay_url.is_none() {
            return Err(ConfigError::Invalid(
                "relay notifier requires 'notifier.relay_url' or MAIL_RELAY_URL".to_string(),
            ));
        }
        Ok(())
    }
}
