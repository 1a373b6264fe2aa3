//! Draw result types, as scraped and after normalization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A results-table row exactly as it appears on the source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDrawResult {
    pub draw_id: String,
    pub draw: String,
    pub date: String,
    /// Comma separated winning numbers, e.g. `"12, 45, 7, 88, 3"`.
    pub numbers: String,
}

/// A single drawn number. `None` marks a piece of the source text that did
/// not coerce to a non-negative integer; it is never counted and never
/// matches a predicted number.
pub type DrawNumber = Option<u32>;

/// A draw row with its numbers parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    pub draw_id: String,
    pub draw: String,
    pub date: String,
    pub numbers: Vec<DrawNumber>,
}

impl DrawRecord {
    /// Iterator over the numbers that parsed successfully.
    pub fn valid_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.numbers.iter().flatten().copied()
    }

    /// Best-effort parse of the scraped date, trying the layouts the results
    /// site has been seen to use.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        const FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d %b %Y", "%b %d, %Y"];
        let raw = self.date.trim();
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }
}
