//! # draw-oracle
//!
//! Scrapes lottery draw results, predicts the next numbers of the active draw
//! from historical frequency, backtests the guess, and keeps the operator
//! informed by email.
//!
//! ## Modules
//!
//! - [`models`]: draw timetable, draw records, predictions, weekly batch
//! - [`scrape`]: paginated results-table scraping
//! - [`services`]: preprocessing, prediction, evaluation and the pipeline
//! - [`cache`]: TTL key-value store for the latest results and prediction
//! - [`db`]: persistence of flushed weekly batches
//! - [`notify`]: email rendering and delivery
//! - [`scheduler`]: the recurring scrape and prediction jobs
//! - [`config`] / [`context`]: configuration loading and startup wiring
//! - [`http`]: axum REST surface (feature `http-server`)

// RepositoryError carries rich context.
#![allow(clippy::result_large_err)]

pub mod cache;
pub mod config;
pub mod context;
pub mod db;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod scrape;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
