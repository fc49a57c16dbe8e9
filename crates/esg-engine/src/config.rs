use serde::{Deserialize, Serialize};

/// Tunables for [`crate::EsgAnalyzer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Extracted text shorter than this (after trimming) takes the fallback path
    pub min_text_chars: usize,
    pub full_confidence: f64,
    pub fallback_confidence: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 50,
            full_confidence: 0.92,
            fallback_confidence: 0.65,
        }
    }
}
