//! Baseline scoring for documents whose text could not be read

use crate::scoring::{clamp_score, NEUTRAL_SCORE};

/// File-name hints, checked in order. First match wins.
const NAME_HINTS: &[(&[&str], i64)] = &[
    (&["sustentavel", "sustentável", "exploracao"], 85),
    (&["refinaria", "distribuicao", "distribuição"], 30),
    (&["transporte", "oleoduto", "pipeline"], 55),
];

pub const LARGE_FILE_BYTES: u64 = 5_000_000;
pub const SMALL_FILE_BYTES: u64 = 500_000;
const LARGE_FILE_PENALTY: i64 = -10;
const SMALL_FILE_BONUS: i64 = 5;

/// Score implied by the file name alone
pub fn name_score(file_name: &str) -> i64 {
    let name = file_name.to_lowercase();
    NAME_HINTS
        .iter()
        .find(|(hints, _)| hints.iter().any(|h| name.contains(h)))
        .map(|&(_, score)| score)
        .unwrap_or(NEUTRAL_SCORE)
}

/// Adjustment for the document size
pub fn size_adjustment(size_bytes: u64) -> i64 {
    if size_bytes > LARGE_FILE_BYTES {
        LARGE_FILE_PENALTY
    } else if size_bytes < SMALL_FILE_BYTES {
        SMALL_FILE_BONUS
    } else {
        0
    }
}

/// Baseline applied to all three categories on the fallback path
pub fn baseline_score(file_name: &str, size_bytes: u64) -> u8 {
    clamp_score(name_score(file_name) + size_adjustment(size_bytes))
}
