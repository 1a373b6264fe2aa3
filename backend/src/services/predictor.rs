//! Frequency-ranked prediction for the active draw.

use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::models::{DrawRecord, DrawScheduleTable, Prediction, PICK_COUNT};

/// Picks the most frequent historical numbers of whichever draw is active.
#[derive(Debug, Clone, Default)]
pub struct Predictor {
    table: DrawScheduleTable,
}

impl Predictor {
    pub fn new(table: DrawScheduleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DrawScheduleTable {
        &self.table
    }

    /// Predict the next numbers of the draw active at `now` (local time).
    ///
    /// The returned prediction is unevaluated (`accuracy == 0`).
    pub fn predict(&self, records: &[DrawRecord], now: NaiveDateTime) -> Prediction {
        let draw = self.table.current_draw(now);
        let matching: Vec<&DrawRecord> = records.iter().filter(|r| r.draw == draw).collect();
        if matching.is_empty() {
            log::warn!("No historical results for draw '{}'", draw);
        }

        Prediction {
            date: now.date().format("%Y-%m-%d").to_string(),
            draw,
            predicted_numbers: rank_numbers(matching, PICK_COUNT),
            accuracy: 0.0,
        }
    }
}

/// Distinct valid numbers by descending count, at most `limit` of them.
///
/// Numbers with equal counts keep the order in which they were first seen.
pub fn rank_numbers<'a, I>(records: I, limit: usize) -> Vec<u32>
where
    I: IntoIterator<Item = &'a DrawRecord>,
{
    let mut tally: Vec<(u32, usize)> = Vec::new();
    let mut slots: HashMap<u32, usize> = HashMap::new();

    for number in records.into_iter().flat_map(|r| r.valid_numbers()) {
        match slots.get(&number) {
            Some(&slot) => tally[slot].1 += 1,
            None => {
                slots.insert(number, tally.len());
                tally.push((number, 1));
            }
        }
    }

    // Stable: equal counts stay in first-encounter order.
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally.into_iter().take(limit).map(|(n, _)| n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(draw: &str, numbers: &[u32]) -> DrawRecord {
        DrawRecord {
            draw_id: "1".to_string(),
            draw: draw.to_string(),
            date: "2024-01-01".to_string(),
            numbers: numbers.iter().copied().map(Some).collect(),
        }
    }

    // 2024-01-01 was a Monday.
    fn monday(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_counts_and_ties() {
        let records = [record("X", &[1, 1, 2])];
        assert_eq!(rank_numbers(&records, 5), vec![1, 2]);

        let records = [record("X", &[7, 3, 9]), record("X", &[9, 3, 7])];
        assert_eq!(rank_numbers(&records, 5), vec![7, 3, 9]);
    }

    #[test]
    fn test_ties_rank_by_first_sighting_not_value() {
        let records = vec![record("X", &[40, 7, 22])];
        assert_eq!(rank_numbers(&records, 5), vec![40, 7, 22]);
    }

    #[test]
    fn test_caps_at_limit() {
        let records = [record("X", &[1, 2, 3, 4, 5, 6, 7]), record("X", &[7])];
        let ranked = rank_numbers(&records, PICK_COUNT);
        assert_eq!(ranked, vec![7, 1, 2, 3, 4]);
    }

    #[test]
    fn test_invalid_numbers_are_ignored() {
        let mut r = record("X", &[5]);
        r.numbers.push(None);
        r.numbers.push(None);
        assert_eq!(rank_numbers([&r], 5), vec![5]);
    }

    #[test]
    fn test_predicts_active_draw_only() {
        let records = vec![
            record("Monday Noon Rush", &[10, 20, 10]),
            record("Monday Special", &[99, 99, 99]),
            record("Monday Noon Rush", &[20, 30]),
        ];
        let prediction = Predictor::default().predict(&records, monday(9));
        assert_eq!(prediction.draw, "Monday Noon Rush");
        assert_eq!(prediction.date, "2024-01-01");
        assert_eq!(prediction.predicted_numbers, vec![10, 20, 30]);
        assert_eq!(prediction.accuracy, 0.0);
    }

    #[test]
    fn test_empty_filtered_set() {
        let records = vec![record("Monday Special", &[1, 2, 3])];
        let prediction = Predictor::default().predict(&records, monday(8));
        assert!(prediction.predicted_numbers.is_empty());
    }

    #[test]
    fn test_unknown_draw_between_slots() {
        let records = vec![record("Monday Noon Rush", &[1])];
        let prediction = Predictor::default().predict(&records, monday(12));
        assert_eq!(prediction.draw, crate::models::UNKNOWN_DRAW);
        assert!(prediction.predicted_numbers.is_empty());
    }
}
