//! Backend for documents that are already text

use super::types::*;

/// Accepts any non-PDF input that decodes as UTF-8
pub struct PlainTextBackend;

impl TextBackend for PlainTextBackend {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PlainText
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        !data.is_empty() && !super::looks_like_pdf(data)
    }

    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ExtractionError::EncodingFailure(e.to_string()))?;
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        Ok(text.split('\x0C').map(str::to_string).collect())
    }
}
