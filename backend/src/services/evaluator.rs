//! Backtesting a prediction against held-out history.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{DrawRecord, Prediction, PICK_COUNT};

/// Share of the history used for training; the rest is the test slice.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// How records are ordered before the train/test split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationOrder {
    /// Keep the scrape order (newest page first on the results site).
    #[default]
    AsScraped,
    /// Stable sort by parsed draw date, oldest first; unparseable dates first.
    Chronological,
}

impl FromStr for EvaluationOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "as-scraped" | "as_scraped" | "scraped" => Ok(Self::AsScraped),
            "chronological" | "date" => Ok(Self::Chronological),
            _ => Err(format!("Unknown evaluation order: {}", s)),
        }
    }
}

impl fmt::Display for EvaluationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsScraped => write!(f, "as-scraped"),
            Self::Chronological => write!(f, "chronological"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluator {
    order: EvaluationOrder,
    train_ratio: f64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluationOrder::default(), DEFAULT_TRAIN_RATIO)
    }
}

impl Evaluator {
    pub fn new(order: EvaluationOrder, train_ratio: f64) -> Self {
        Self {
            order,
            train_ratio: train_ratio.clamp(0.0, 1.0),
        }
    }

    pub fn order(&self) -> EvaluationOrder {
        self.order
    }

    /// Percentage of test-slice numbers that appear in the prediction.
    ///
    /// The test slice is everything after `floor(len * train_ratio)`; each
    /// record contributes [`PICK_COUNT`] possible hits. An empty slice scores 0.
    pub fn evaluate(&self, records: &[DrawRecord], prediction: &Prediction) -> f64 {
        let ordered: Vec<&DrawRecord> = match self.order {
            EvaluationOrder::AsScraped => records.iter().collect(),
            EvaluationOrder::Chronological => {
                let mut sorted: Vec<&DrawRecord> = records.iter().collect();
                sorted.sort_by_key(|r| r.parsed_date());
                sorted
            }
        };

        let split = (ordered.len() as f64 * self.train_ratio).floor() as usize;
        let test = &ordered[split.min(ordered.len())..];
        if test.is_empty() {
            return 0.0;
        }

        let hits: usize = test
            .iter()
            .map(|r| {
                r.valid_numbers()
                    .filter(|n| prediction.predicted_numbers.contains(n))
                    .count()
            })
            .sum();

        hits as f64 / (test.len() * PICK_COUNT) as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, numbers: &[u32]) -> DrawRecord {
        DrawRecord {
            draw_id: date.to_string(),
            draw: "Midweek".to_string(),
            date: date.to_string(),
            numbers: numbers.iter().copied().map(Some).collect(),
        }
    }

    fn prediction(numbers: &[u32]) -> Prediction {
        Prediction {
            date: "2024-01-10".to_string(),
            draw: "Midweek".to_string(),
            predicted_numbers: numbers.to_vec(),
            accuracy: 0.0,
        }
    }

    #[test]
    fn test_empty_test_slice_is_zero() {
        let evaluator = Evaluator::default();
        assert_eq!(evaluator.evaluate(&[], &prediction(&[1, 2])), 0.0);
        // floor(1 * 0.8) = 0, so one record is still tested.
        let one = [record("2024-01-01", &[1, 2, 3, 4, 5])];
        assert_eq!(evaluator.evaluate(&one, &prediction(&[1, 2])), 40.0);

        let all_training = Evaluator::new(EvaluationOrder::AsScraped, 1.0);
        assert_eq!(all_training.evaluate(&one, &prediction(&[1, 2])), 0.0);
    }

    #[test]
    fn test_scores_tail_as_scraped() {
        let mut records: Vec<DrawRecord> = (1..=8)
            .map(|d| record(&format!("2024-01-{d:02}"), &[90, 91, 92, 93, 94]))
            .collect();
        records.push(record("2024-01-09", &[1, 2, 3, 4, 5]));
        records.push(record("2024-01-10", &[1, 6, 7, 8, 9]));

        let score = Evaluator::default().evaluate(&records, &prediction(&[1, 2, 3]));
        // 3 + 1 hits out of 2 * 5.
        assert!((score - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_chronological_order_changes_slice() {
        // Newest first, as the results site lists them.
        let mut records: Vec<DrawRecord> = vec![record("2024-01-10", &[1, 2, 3, 4, 5])];
        records.extend((1..=4).map(|d| record(&format!("2024-01-0{d}"), &[50, 51, 52, 53, 54])));

        let p = prediction(&[1, 2, 3, 4, 5]);
        let scraped = Evaluator::new(EvaluationOrder::AsScraped, 0.8).evaluate(&records, &p);
        let chronological = Evaluator::new(EvaluationOrder::Chronological, 0.8).evaluate(&records, &p);
        assert_eq!(scraped, 0.0);
        assert!((chronological - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_numbers_never_match() {
        let mut r = record("2024-01-01", &[1]);
        r.numbers.extend([None, None, None, None]);
        let score = Evaluator::default().evaluate(&[r], &prediction(&[1, 2, 3, 4, 5]));
        assert!((score - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_from_str() {
        assert_eq!(
            EvaluationOrder::from_str("Chronological").unwrap(),
            EvaluationOrder::Chronological
        );
        assert_eq!(
            EvaluationOrder::from_str("as-scraped").unwrap(),
            EvaluationOrder::AsScraped
        );
        assert!(EvaluationOrder::from_str("random").is_err());
        assert_eq!(EvaluationOrder::Chronological.to_string(), "chronological");
    }
}
