//! Whole-document extraction backend using pdf-extract

use super::types::*;

/// Backend using pdf-extract (handles CID fonts and ToUnicode CMaps)
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBackend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfExtract
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        super::looks_like_pdf(data)
    }

    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let text = pdf_extract::extract_text_from_mem(data).map_err(|e| {
            let error_str = e.to_string();
            if error_str.contains("Identity-H") || error_str.contains("Unimplemented") {
                ExtractionError::EncodingFailure(error_str)
            } else {
                ExtractionError::ParseError(error_str)
            }
        })?;

        // pdf-extract separates pages with form feeds
        Ok(text.split('\x0C').map(str::to_string).collect())
    }
}
