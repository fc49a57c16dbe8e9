//! Score calculation from keyword tallies
//!
//! Every category starts at a neutral 50. Each positive match adds 5 and
//! each negative match removes 8, so one documented violation outweighs one
//! documented strength. Results are clamped to [0, 100].

use esg_types::Category;
use serde::{Deserialize, Serialize};

use crate::scanner::{KeywordTally, SignCounts};

pub const NEUTRAL_SCORE: i64 = 50;
pub const POSITIVE_WEIGHT: i64 = 5;
pub const NEGATIVE_WEIGHT: i64 = 8;

/// Clamp any raw score into the [0, 100] range
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Score for one category from its positive/negative counts
pub fn score_category(counts: SignCounts) -> u8 {
    let raw = NEUTRAL_SCORE
        .saturating_add(POSITIVE_WEIGHT.saturating_mul(i64::from(counts.positive)))
        .saturating_sub(NEGATIVE_WEIGHT.saturating_mul(i64::from(counts.negative)));
    clamp_score(raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub environmental: u8,
    pub social: u8,
    pub governance: u8,
}

impl CategoryScores {
    pub fn from_tally(tally: &KeywordTally) -> Self {
        Self {
            environmental: score_category(tally.environmental),
            social: score_category(tally.social),
            governance: score_category(tally.governance),
        }
    }

    /// Same score for every category (used by the fallback path)
    pub fn uniform(score: u8) -> Self {
        Self {
            environmental: score,
            social: score,
            governance: score,
        }
    }

    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Environmental => self.environmental,
            Category::Social => self.social,
            Category::Governance => self.governance,
        }
    }

    /// Exact mean of the three scores
    pub fn mean(&self) -> f64 {
        (f64::from(self.environmental) + f64::from(self.social) + f64::from(self.governance))
            / 3.0
    }

    /// Rounded mean of the three scores
    pub fn overall(&self) -> u8 {
        self.mean().round() as u8
    }
}
