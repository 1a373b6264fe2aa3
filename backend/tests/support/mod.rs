#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use draw_oracle::cache::{CacheError, CacheStore, LocalCache};
use draw_oracle::config::AppConfig;
use draw_oracle::context::{AppContext, Components};
use draw_oracle::db::{LocalRepository, PredictionRepository};
use draw_oracle::notify::{EmailMessage, LocalNotifier, Notifier, NotifyError};
use draw_oracle::scheduler::FakeClock;
use draw_oracle::scrape::{PageRows, PageSession, PageSource, ScrapeError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Fakes
// =============================================================================

/// Serves the same pages on every scrape and counts sessions.
#[derive(Clone, Default)]
pub struct FixedPages {
    pages: Arc<Vec<PageRows>>,
    pub sessions: Arc<AtomicUsize>,
}

impl FixedPages {
    pub fn new(pages: Vec<PageRows>) -> Self {
        Self {
            pages: Arc::new(pages),
            sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

struct FixedSession {
    pages: Arc<Vec<PageRows>>,
}

#[async_trait]
impl PageSource for FixedPages {
    async fn open_session(&self) -> Result<Box<dyn PageSession>, ScrapeError> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixedSession {
            pages: self.pages.clone(),
        }))
    }
}

#[async_trait]
impl PageSession for FixedSession {
    async fn fetch_rows(&mut self, page: u32) -> Result<PageRows, ScrapeError> {
        self.pages
            .get(page as usize - 1)
            .cloned()
            .ok_or_else(|| ScrapeError::Session(format!("page {page} unavailable")))
    }

    async fn close(&mut self) {}
}

/// Notifier that rejects every message.
#[derive(Clone, Default)]
pub struct FailingNotifier {
    pub attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: EmailMessage) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError::Delivery("relay offline".to_string()))
    }
}

/// Cache that is never reachable.
pub struct UnavailableCache;

#[async_trait]
impl CacheStore for UnavailableCache {
    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn row(id: &str, draw: &str, date: &str, numbers: &str) -> Vec<String> {
    vec![id.into(), draw.into(), date.into(), numbers.into()]
}

/// Two pages of "Monday Special" history plus one unrelated draw.
pub fn monday_special_pages() -> Vec<PageRows> {
    vec![
        vec![
            row("501", "Monday Special", "2024-01-01", "5, 17, 23, 41, 88"),
            row("500", "Midweek", "2023-12-27", "1, 2, 3, 4, 5"),
            row("499", "Monday Special", "2023-12-25", "17, 23, 60, 61, 62"),
        ],
        vec![
            row("498", "Monday Special", "2023-12-18", "17, 5, 70, 71, 72"),
            row("497", "Monday Special", "2023-12-11", "23, 17, 5, 80, 81"),
        ],
    ]
}

/// Monday 2024-01-08 at 14:00, inside "Monday Special".
pub fn monday_afternoon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 8)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap()
}

pub struct TestContext {
    pub context: AppContext,
    pub repository: LocalRepository,
    pub notifier: LocalNotifier,
    pub cache: LocalCache,
    pub pages: FixedPages,
}

pub fn test_config(batch_size: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.scraper.pages = 2;
    config.schedule.batch_size = batch_size;
    config.notifier.recipient = "ops@example.com".to_string();
    config
}

/// Context with in-memory collaborators and a clock pinned to `now`.
pub fn test_context(config: AppConfig, pages: Vec<PageRows>, now: NaiveDateTime) -> TestContext {
    let repository = LocalRepository::new();
    let notifier = LocalNotifier::new();
    let cache = LocalCache::new();
    let pages = FixedPages::new(pages);
    let components = Components {
        clock: Arc::new(FakeClock::new(now)),
        cache: Arc::new(cache.clone()),
        notifier: Arc::new(notifier.clone()),
        repository: Arc::new(repository.clone()) as Arc<dyn PredictionRepository>,
        source: Arc::new(pages.clone()),
    };
    TestContext {
        context: AppContext::from_parts(config, components),
        repository,
        notifier,
        cache,
        pages,
    }
}

/// Context whose notifier always fails.
pub fn failing_notifier_context(config: AppConfig, now: NaiveDateTime) -> (AppContext, LocalRepository, FailingNotifier) {
    let repository = LocalRepository::new();
    let notifier = FailingNotifier::default();
    let components = Components {
        clock: Arc::new(FakeClock::new(now)),
        cache: Arc::new(LocalCache::new()),
        notifier: Arc::new(notifier.clone()),
        repository: Arc::new(repository.clone()),
        source: Arc::new(FixedPages::new(monday_special_pages())),
    };
    (AppContext::from_parts(config, components), repository, notifier)
}

/// Context whose cache is unreachable.
pub fn unavailable_cache_context(config: AppConfig, now: NaiveDateTime) -> AppContext {
    let components = Components {
        clock: Arc::new(FakeClock::new(now)),
        cache: Arc::new(UnavailableCache),
        notifier: Arc::new(LocalNotifier::new()),
        repository: Arc::new(LocalRepository::new()),
        source: Arc::new(FixedPages::new(monday_special_pages())),
    };
    AppContext::from_parts(config, components)
}
