//! HTTP surface.
//!
//! ```text
//! GET /health                    liveness + repository status
//! GET /api/scrape                scrape now, return raw rows
//! GET /api/predict               run the pipeline now
//! GET /api/predictions/latest    cached latest prediction
//! GET /api/predictions?limit=N   persisted predictions, newest first
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
