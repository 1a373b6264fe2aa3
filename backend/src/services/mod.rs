//! Prediction services.
//!
//! The pure stages ([`preprocess`], [`Predictor`], [`Evaluator`]) carry no I/O;
//! [`PredictionPipeline`] wires them to the scraper, cache and notifier.

pub mod evaluator;
pub mod pipeline;
pub mod predictor;
pub mod preprocess;

pub use evaluator::{EvaluationOrder, Evaluator, DEFAULT_TRAIN_RATIO};
pub use pipeline::{PipelineError, PredictionPipeline};
pub use predictor::{rank_numbers, Predictor};
pub use preprocess::{parse_number, preprocess};
