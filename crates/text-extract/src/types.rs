//! Common types for text extraction

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which path produced the extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    PdfExtract,
    Lopdf,
    PlainText,
    RawBytes,
    None,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtractionMethod::PdfExtract => "pdf-extract",
            ExtractionMethod::Lopdf => "lopdf",
            ExtractionMethod::PlainText => "plain-text",
            ExtractionMethod::RawBytes => "raw-bytes",
            ExtractionMethod::None => "none",
        };
        f.write_str(name)
    }
}

/// Plain-text representation of a document. May be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
    pub page_count: Option<u32>,
    pub warnings: Vec<String>,
}

impl ExtractedText {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            method: ExtractionMethod::None,
            page_count: None,
            warnings: Vec::new(),
        }
    }

    /// Number of characters after trimming surrounding whitespace
    pub fn char_count(&self) -> usize {
        self.text.trim().chars().count()
    }

    /// True when there is enough text to be worth scanning
    pub fn is_meaningful(&self, min_chars: usize) -> bool {
        self.char_count() >= min_chars
    }

    /// True when the text did not come from a real decoder
    pub fn is_fallback(&self) -> bool {
        matches!(
            self.method,
            ExtractionMethod::RawBytes | ExtractionMethod::None
        )
    }
}

/// Errors raised by individual backends. Never escapes the extractor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Encoding failure: {0}")]
    EncodingFailure(String),

    #[error("Garbage output detected (garbage ratio {0:.3})")]
    GarbageOutput(f64),

    #[error("Decoder panicked: {0}")]
    DecoderPanic(String),
}

/// A single extraction backend
pub trait TextBackend {
    fn name(&self) -> &'static str;

    fn method(&self) -> ExtractionMethod;

    /// Cheap check on the raw bytes, no parsing
    fn can_handle(&self, data: &[u8]) -> bool;

    /// Extract text per page
    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Result of output validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub is_valid: bool,
    pub garbage_ratio: f64,
    pub private_use_area_ratio: f64,
    pub details: String,
}

const GARBAGE_THRESHOLD: f64 = 0.15;
const PUA_THRESHOLD: f64 = 0.10;

/// Flag decoder output dominated by replacement, private-use or control characters
pub fn analyze_text_quality(text: &str) -> QualityReport {
    let total = text.chars().count();
    if total == 0 {
        return QualityReport {
            is_valid: false,
            garbage_ratio: 1.0,
            private_use_area_ratio: 0.0,
            details: "Empty text".to_string(),
        };
    }

    let mut replacement = 0usize;
    let mut private_use = 0usize;
    let mut control = 0usize;

    for c in text.chars() {
        match c {
            '\u{FFFD}' => replacement += 1,
            '\u{E000}'..='\u{F8FF}' => private_use += 1,
            '\n' | '\r' | '\t' | '\x0C' => {}
            c if c.is_control() => control += 1,
            _ => {}
        }
    }

    let garbage_ratio = (replacement + private_use + control) as f64 / total as f64;
    let pua_ratio = private_use as f64 / total as f64;

    if garbage_ratio > GARBAGE_THRESHOLD {
        return QualityReport {
            is_valid: false,
            garbage_ratio,
            private_use_area_ratio: pua_ratio,
            details: format!(
                "High garbage ratio: {:.1}% (replacement: {}, PUA: {}, control: {})",
                garbage_ratio * 100.0,
                replacement,
                private_use,
                control
            ),
        };
    }

    if pua_ratio > PUA_THRESHOLD {
        return QualityReport {
            is_valid: false,
            garbage_ratio,
            private_use_area_ratio: pua_ratio,
            details: format!(
                "High Private Use Area ratio: {:.1}% - likely encoding failure",
                pua_ratio * 100.0
            ),
        };
    }

    QualityReport {
        is_valid: true,
        garbage_ratio,
        private_use_area_ratio: pua_ratio,
        details: format!("Valid output: {:.2}% garbage", garbage_ratio * 100.0),
    }
}
