//! Normalization of scraped rows into typed draw records.

use crate::models::{DrawNumber, DrawRecord, RawDrawResult};

/// Convert raw rows into draw records, preserving length and order.
pub fn preprocess(raw: &[RawDrawResult]) -> Vec<DrawRecord> {
    raw.iter()
        .map(|row| DrawRecord {
            draw_id: row.draw_id.clone(),
            draw: row.draw.clone(),
            date: row.date.clone(),
            numbers: row.numbers.split(',').map(parse_number).collect(),
        })
        .collect()
}

/// Parse one comma-separated piece. Anything that is not a non-negative
/// integer after trimming (empty, fractional, negative, text) is invalid.
pub fn parse_number(piece: &str) -> DrawNumber {
    let piece = piece.trim();
    if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    piece.parse().ok()
}
