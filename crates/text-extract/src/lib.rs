//! Best-effort document text extraction
//!
//! Backends are tried in order until one yields readable text:
//! - pdf-extract: whole-document decoding (CID fonts, ToUnicode CMaps)
//! - lopdf: per-page content stream decoding
//! - plain-text: non-PDF input that is valid UTF-8
//!
//! When every backend fails, the raw bytes are scanned for printable ASCII.
//! A PDF that parses but carries no text layer yields empty text instead,
//! since its raw bytes are only PDF syntax.
//! [`TextExtractor::extract`] never returns an error and never panics on
//! malformed input; the worst case is an empty string.
//!
//! Decoder panics are contained with `catch_unwind`, but the process panic
//! hook still runs for them. Binaries that want quiet logs should install
//! their own hook (the server routes panics to `tracing`).

#[cfg(feature = "pdf")]
pub mod legacy;
#[cfg(feature = "pdf")]
pub mod native;
pub mod plain;
pub mod raw;
pub mod types;

pub use types::*;

use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Separator placed between page texts
pub const PAGE_SEPARATOR: &str = "\n";

/// True when the buffer starts with a PDF header (leading whitespace allowed)
pub fn looks_like_pdf(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    data[start..].starts_with(b"%PDF")
}

/// Ordered chain of extraction backends
pub struct TextExtractor {
    backends: Vec<Box<dyn TextBackend + Send + Sync>>,
}

impl TextExtractor {
    pub fn new() -> Self {
        let mut backends: Vec<Box<dyn TextBackend + Send + Sync>> = Vec::new();
        #[cfg(feature = "pdf")]
        {
            backends.push(Box::new(legacy::PdfExtractBackend::new()));
            backends.push(Box::new(native::LopdfBackend::new()));
        }
        backends.push(Box::new(plain::PlainTextBackend));
        Self { backends }
    }

    /// Build an extractor with a custom backend chain
    pub fn with_backends(backends: Vec<Box<dyn TextBackend + Send + Sync>>) -> Self {
        Self { backends }
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Extract text from a document. Always returns, possibly with empty text.
    pub fn extract(&self, data: &[u8]) -> ExtractedText {
        if data.is_empty() {
            return ExtractedText::empty();
        }

        let mut warnings = Vec::new();
        let is_pdf = looks_like_pdf(data);
        // Set once a decoder has read the PDF structure, with or without text
        let mut parsed_pages: Option<u32> = None;

        for backend in &self.backends {
            if !backend.can_handle(data) {
                continue;
            }

            match run_backend(backend.as_ref(), data) {
                Ok(pages) => {
                    if is_pdf {
                        parsed_pages.get_or_insert(pages.len() as u32);
                    }
                    let text = pages.join(PAGE_SEPARATOR);
                    if text.trim().is_empty() {
                        debug!(backend = backend.name(), "Backend produced no text");
                        warnings.push(format!("{}: no text layer", backend.name()));
                        continue;
                    }

                    let quality = analyze_text_quality(&text);
                    if !quality.is_valid {
                        debug!(backend = backend.name(), details = %quality.details, "Rejected backend output");
                        warnings.push(format!(
                            "{}: {}",
                            backend.name(),
                            ExtractionError::GarbageOutput(quality.garbage_ratio)
                        ));
                        continue;
                    }

                    debug!(
                        backend = backend.name(),
                        pages = pages.len(),
                        chars = text.len(),
                        "Extraction succeeded"
                    );
                    return ExtractedText {
                        text,
                        method: backend.method(),
                        page_count: Some(pages.len() as u32),
                        warnings,
                    };
                }
                Err(e) => {
                    debug!(backend = backend.name(), error = %e, "Backend failed");
                    warnings.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        // A readable PDF without a text layer (scanned, image-only): its raw
        // bytes are PDF syntax, not document text
        if let Some(pages) = parsed_pages {
            warn!(pages = pages, "PDF has no readable text layer, skipping raw byte scan");
            warnings.push("raw-bytes: skipped, PDF has no text layer".to_string());
            return ExtractedText {
                text: String::new(),
                method: ExtractionMethod::None,
                page_count: Some(pages),
                warnings,
            };
        }

        let text = raw::scan_printable(data);
        warn!(
            chars = text.len(),
            "All decoders failed, using raw byte scan"
        );
        ExtractedText {
            method: if text.is_empty() {
                ExtractionMethod::None
            } else {
                ExtractionMethod::RawBytes
            },
            text,
            page_count: None,
            warnings,
        }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a backend, converting decoder panics into errors
fn run_backend(
    backend: &(dyn TextBackend + Send + Sync),
    data: &[u8],
) -> Result<Vec<String>, ExtractionError> {
    panic::catch_unwind(AssertUnwindSafe(|| backend.extract_pages(data))).unwrap_or_else(
        |payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ExtractionError::DecoderPanic(message))
        },
    )
}

/// Convenience wrapper using the default backend chain
pub fn extract_text(data: &[u8]) -> ExtractedText {
    TextExtractor::new().extract(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    struct PanickingBackend;

    impl TextBackend for PanickingBackend {
        fn name(&self) -> &'static str {
            "panicking"
        }
        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::PdfExtract
        }
        fn can_handle(&self, _data: &[u8]) -> bool {
            true
        }
        fn extract_pages(&self, _data: &[u8]) -> Result<Vec<String>, ExtractionError> {
            panic!("decoder blew up")
        }
    }

    struct FixedBackend(&'static [&'static str]);

    impl TextBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::Lopdf
        }
        fn can_handle(&self, _data: &[u8]) -> bool {
            true
        }
        fn extract_pages(&self, _data: &[u8]) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    #[test]
    fn test_empty_input_yields_empty_text() {
        let extracted = extract_text(b"");
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.method, ExtractionMethod::None);
    }

    #[test]
    fn test_plain_utf8_document() {
        let extracted = extract_text("Relatório de auditoria independente".as_bytes());
        assert_eq!(extracted.method, ExtractionMethod::PlainText);
        assert_eq!(extracted.text, "Relatório de auditoria independente");
    }

    #[test]
    fn test_broken_pdf_falls_back_to_raw_scan() {
        let data = b"%PDF-1.4\n1 0 obj << /Length 0 >> stream\nenergia limpa e auditoria\nendstream";
        let extracted = extract_text(data);
        assert!(extracted.is_fallback());
        assert!(extracted.text.contains("energia limpa e auditoria"));
        assert!(!extracted.warnings.is_empty());
    }

    #[test]
    fn test_binary_noise_gives_raw_or_empty() {
        let extracted = extract_text(&[0xC3, 0x00, 0xFF, 0x10, 0x80]);
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.method, ExtractionMethod::None);
    }

    #[test]
    fn test_backend_panic_is_contained() {
        let extractor = TextExtractor::with_backends(vec![
            Box::new(PanickingBackend),
            Box::new(FixedBackend(&["page one", "page two"])),
        ]);
        let extracted = extractor.extract(b"anything");
        assert_eq!(extracted.method, ExtractionMethod::Lopdf);
        assert_eq!(extracted.text, "page one\npage two");
        assert_eq!(extracted.page_count, Some(2));
        assert!(extracted.warnings[0].contains("decoder blew up"));
    }

    #[test]
    fn test_looks_like_pdf_allows_leading_whitespace() {
        assert!(looks_like_pdf(b"\n  %PDF-1.5"));
        assert!(!looks_like_pdf(b"PDF"));
        assert!(!looks_like_pdf(b""));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_default_chain_order() {
        assert_eq!(
            TextExtractor::new().backend_names(),
            vec!["pdf-extract", "lopdf", "plain-text"]
        );
    }

    proptest! {
        /// Property: extraction is total over arbitrary bytes
        #[test]
        fn extraction_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let extracted = extract_text(&data);
            prop_assert!(extracted.text.len() <= data.len() * 4);
        }

        /// Property: arbitrary bytes behind a PDF header still produce a result
        #[test]
        fn fake_pdf_never_panics(tail in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut data = b"%PDF-1.4\n".to_vec();
            data.extend_from_slice(&tail);
            let extracted = extract_text(&data);
            prop_assert!(extracted.method != ExtractionMethod::PlainText);
        }
    }
}
