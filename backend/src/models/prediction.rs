//! Prediction values and the weekly accumulation buffer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database identity of a stored prediction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionId(pub i64);

impl PredictionId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PredictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of predicted numbers per draw.
pub const PICK_COUNT: usize = 5;

/// Predictions accumulated before a weekly flush (two per day for a week).
pub const DEFAULT_BATCH_SIZE: usize = 14;

/// Draw name used for the weekly summary notification.
pub const WEEKLY_SUMMARY_DRAW: &str = "Weekly Summary";

/// A ranked guess for the next draw, plus its backtested accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// ISO date (`YYYY-MM-DD`) the prediction was made on.
    pub date: String,
    pub draw: String,
    /// At most [`PICK_COUNT`] numbers, most frequent first.
    pub predicted_numbers: Vec<u32>,
    /// Percentage in `[0, 100]`; zero until evaluated.
    pub accuracy: f64,
}

/// A prediction as read back from persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPrediction {
    pub id: PredictionId,
    #[serde(flatten)]
    pub prediction: Prediction,
    pub created_at: DateTime<Utc>,
}

/// Aggregate of a flushed batch, used for the weekly summary email.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    /// Every predicted number in the batch, first occurrence order, no repeats.
    pub numbers: Vec<u32>,
    pub mean_accuracy: f64,
}

/// Append-only buffer of predictions awaiting a bulk write.
#[derive(Debug, Clone)]
pub struct WeeklyBatch {
    entries: Vec<Prediction>,
    capacity: usize,
}

impl WeeklyBatch {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a prediction; returns `true` once the batch is full.
    pub fn push(&mut self, prediction: Prediction) -> bool {
        self.entries.push(prediction);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[Prediction] {
        &self.entries
    }

    /// Take every buffered prediction, leaving the batch empty.
    pub fn flush_and_clear(&mut self) -> Vec<Prediction> {
        std::mem::replace(&mut self.entries, Vec::with_capacity(self.capacity))
    }
}

impl Default for WeeklyBatch {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchSummary {
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let mut numbers: Vec<u32> = Vec::new();
        for n in predictions.iter().flat_map(|p| p.predicted_numbers.iter()) {
            if !numbers.contains(n) {
                numbers.push(*n);
            }
        }
        let mean_accuracy = if predictions.is_empty() {
            0.0
        } else {
            predictions.iter().map(|p| p.accuracy).sum::<f64>() / predictions.len() as f64
        };
        Self {
            numbers,
            mean_accuracy,
        }
    }

    /// Mean accuracy rendered with two decimals, as shown in the summary.
    pub fn formatted_accuracy(&self) -> String {
        format!("{:.2}", self.mean_accuracy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(numbers: Vec<u32>, accuracy: f64) -> Prediction {
        Prediction {
            date: "2024-01-01".to_string(),
            draw: "Midweek".to_string(),
            predicted_numbers: numbers,
            accuracy,
        }
    }

    #[test]
    fn test_batch_fills_at_capacity() {
        let mut batch = WeeklyBatch::new(3);
        assert!(!batch.push(prediction(vec![1], 0.0)));
        assert!(!batch.push(prediction(vec![2], 0.0)));
        assert!(batch.push(prediction(vec![3], 0.0)));
        assert_eq!(batch.len(), 3);

        let flushed = batch.flush_and_clear();
        assert_eq!(flushed.len(), 3);
        assert!(batch.is_empty());
        assert!(!batch.is_full());
    }

    #[test]
    fn test_default_batch_holds_a_week_of_runs() {
        assert_eq!(WeeklyBatch::default().capacity(), 14);
    }

    #[test]
    fn test_summary_union_and_mean() {
        let summary = BatchSummary::from_predictions(&[
            prediction(vec![5, 9, 12], 20.0),
            prediction(vec![9, 40], 10.0),
            prediction(vec![], 15.0),
        ]);
        assert_eq!(summary.numbers, vec![5, 9, 12, 40]);
        assert!((summary.mean_accuracy - 15.0).abs() < 1e-9);
        assert_eq!(summary.formatted_accuracy(), "15.00");
    }

    #[test]
    fn test_summary_of_empty_batch() {
        let summary = BatchSummary::from_predictions(&[]);
        assert!(summary.numbers.is_empty());
        assert_eq!(summary.formatted_accuracy(), "0.00");
    }

    #[test]
    fn test_stored_prediction_json_shape() {
        let stored = StoredPrediction {
            id: PredictionId::new(42),
            prediction: prediction(vec![1], 0.0),
            created_at: DateTime::parse_from_rfc3339("2024-01-07T06:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["draw"], "Midweek");
        assert_eq!(stored.id.to_string(), "42");
    }

    #[test]
    fn test_prediction_json_shape() {
        let p = prediction(vec![7, 3], 12.5);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["predictedNumbers"], serde_json::json!([7, 3]));
        assert_eq!(json["accuracy"], 12.5);
        let back: Prediction = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
