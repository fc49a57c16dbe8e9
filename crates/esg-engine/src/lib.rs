//! ESG contract scoring
//!
//! Pipeline: text extraction, keyword scan, category scores, result
//! synthesis. When too little text can be extracted the document is scored
//! from its name and size instead, at lower confidence.

pub mod compliance;
pub mod config;
pub mod fallback;
pub mod lexicon;
pub mod scanner;
pub mod scoring;
pub mod synthesizer;

pub use compliance::{Framework, FRAMEWORKS};
pub use config::AnalyzerConfig;
pub use lexicon::{CategoryTerms, KeywordLexicon, LexiconError, DEFAULT_LEXICON};
pub use scanner::{KeywordTally, SignCounts};
pub use scoring::CategoryScores;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use esg_types::AnalysisResult;
use synthesizer::Evidence;
use text_extract::TextExtractor;
use tracing::{debug, info, warn};

/// A document submitted for analysis
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }
}

/// Identity and metadata attached to one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    pub contract_id: String,
    pub file_name: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl AnalysisContext {
    pub fn for_document(
        document: &Document,
        contract_id: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            file_name: document.name.clone(),
            size_bytes: document.size_bytes,
            uploaded_at,
        }
    }
}

/// Analyzer entry point. Holds only immutable state and is shared freely
/// across threads.
pub struct EsgAnalyzer {
    lexicon: Arc<KeywordLexicon>,
    config: AnalyzerConfig,
    extractor: TextExtractor,
}

impl EsgAnalyzer {
    pub fn new(lexicon: Arc<KeywordLexicon>, config: AnalyzerConfig) -> Self {
        Self {
            lexicon,
            config,
            extractor: TextExtractor::new(),
        }
    }

    /// Replace the extraction backend chain
    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Analyze with a fresh contract id and the current time
    pub fn analyze(&self, document: &Document) -> AnalysisResult {
        let contract_id = uuid::Uuid::new_v4().to_string();
        self.analyze_with(document, contract_id, Utc::now())
    }

    /// Analyze with caller-supplied identity. Deterministic in all inputs.
    pub fn analyze_with(
        &self,
        document: &Document,
        contract_id: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> AnalysisResult {
        let context = AnalysisContext::for_document(document, contract_id, uploaded_at);
        let extracted = self.extractor.extract(&document.bytes);

        debug!(
            contract_id = %context.contract_id,
            method = %extracted.method,
            chars = extracted.char_count(),
            warnings = extracted.warnings.len(),
            "Text extracted"
        );

        if !extracted.is_meaningful(self.config.min_text_chars) {
            warn!(
                contract_id = %context.contract_id,
                file = %context.file_name,
                chars = extracted.char_count(),
                min_chars = self.config.min_text_chars,
                "Insufficient text, using fallback analysis"
            );
            return self.fallback(&context);
        }

        self.analyze_text(&extracted.text, &context)
    }

    /// Full keyword analysis of already-extracted text. No length threshold.
    pub fn analyze_text(&self, text: &str, context: &AnalysisContext) -> AnalysisResult {
        let tally = scanner::scan(text, &self.lexicon);
        let scores = CategoryScores::from_tally(&tally);
        let result = synthesizer::synthesize(
            context,
            scores,
            Evidence::Keywords(&tally),
            self.config.full_confidence,
        );

        info!(
            contract_id = %result.contract_id,
            overall = result.overall_score,
            environmental = scores.environmental,
            social = scores.social,
            governance = scores.governance,
            keywords = result.keywords_found.len(),
            status = ?result.compliance.status,
            "Analysis complete"
        );
        result
    }

    /// Degraded analysis from file name and size only
    pub fn fallback(&self, context: &AnalysisContext) -> AnalysisResult {
        let baseline = fallback::baseline_score(&context.file_name, context.size_bytes);
        let result = synthesizer::synthesize(
            context,
            CategoryScores::uniform(baseline),
            Evidence::Limited,
            self.config.fallback_confidence,
        );

        info!(
            contract_id = %result.contract_id,
            overall = result.overall_score,
            "Fallback analysis complete"
        );
        result
    }
}

impl Default for EsgAnalyzer {
    fn default() -> Self {
        Self::new(
            Arc::new(DEFAULT_LEXICON.clone()),
            AnalyzerConfig::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use esg_types::{AnalysisMode, ComplianceStatus, RiskLevel};
    use lopdf::{content::Content, content::Operation, Dictionary, Object, Stream, StringFormat};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use text_extract::{ExtractionError, ExtractionMethod, TextBackend};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn text_doc(name: &str, text: &str) -> Document {
        Document::new(name, text.as_bytes().to_vec())
    }

    /// Build a PDF with one page per operation list
    fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut page_ids = Vec::new();

        for operations in pages {
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            page_ids.push(doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ])));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Count", Object::Integer(page_ids.len() as i64)),
                (
                    "Kids",
                    Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
                ),
            ])),
        );
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn text_page(text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
            Operation::new(
                "Tj",
                vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]
    }

    fn image_page() -> Vec<Operation> {
        vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                [612, 0, 0, 792, 0, 0]
                    .iter()
                    .map(|&v| Object::Integer(v))
                    .collect(),
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ]
    }

    /// Backend that only answers for PDFs and yields nothing
    struct NoTextLayer;

    impl TextBackend for NoTextLayer {
        fn name(&self) -> &'static str {
            "no-text"
        }
        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::Lopdf
        }
        fn can_handle(&self, data: &[u8]) -> bool {
            text_extract::looks_like_pdf(data)
        }
        fn extract_pages(&self, _data: &[u8]) -> Result<Vec<String>, ExtractionError> {
            Ok(vec![String::new()])
        }
    }

    #[test]
    fn test_text_layer_pdf_gets_full_analysis() {
        let analyzer = EsgAnalyzer::default();
        let pdf = build_pdf(vec![
            text_page("Compromisso com energia limpa e biodiversidade no contrato de fornecimento"),
            text_page("Houve vazamento no terminal e multa aplicada ao operador do contrato"),
        ]);
        let result = analyzer.analyze_with(&Document::new("contrato.pdf", pdf), "pdf-1", at());

        assert_eq!(result.analysis_mode, AnalysisMode::Full);
        assert_eq!(result.confidence, 0.92);
        // env: energia limpa, limpa, biodiversidade against vazamento
        assert_eq!(result.categories.environmental.score, 57);
        // "biodiversidade" contains "diversidade"
        assert_eq!(result.categories.social.score, 55);
        assert_eq!(result.categories.governance.score, 50);
        assert!(result.keywords_found.contains(&"-vazamento(1)".to_string()));
    }

    #[test]
    fn test_image_only_pdf_is_degraded() {
        let analyzer = EsgAnalyzer::default();
        let pdf = build_pdf(vec![image_page()]);
        let result = analyzer.analyze_with(&Document::new("refinaria.pdf", pdf), "pdf-2", at());

        assert_eq!(result.analysis_mode, AnalysisMode::Degraded);
        assert_eq!(result.confidence, 0.65);
        // refinaria hint 30, small file +5
        assert_eq!(result.overall_score, 35);
        assert!(result.keywords_found.is_empty());
    }

    #[test]
    fn test_custom_extractor_without_text_layer_is_degraded() {
        let analyzer = EsgAnalyzer::default()
            .with_extractor(TextExtractor::with_backends(vec![Box::new(NoTextLayer)]));
        let pdf = build_pdf(vec![text_page(
            "Compromisso com energia limpa e biodiversidade no contrato de fornecimento",
        )]);
        let result = analyzer.analyze_with(&Document::new("contrato.pdf", pdf), "pdf-3", at());

        assert_eq!(result.analysis_mode, AnalysisMode::Degraded);
        assert_eq!(result.overall_score, 55);
    }

    #[test]
    fn test_repeated_positive_term_raises_environmental() {
        let analyzer = EsgAnalyzer::default();
        let doc = text_doc(
            "contrato.txt",
            "Projeto sustentável na bacia. Operação sustentável e futuro sustentável para todos.",
        );
        let result = analyzer.analyze_with(&doc, "c-1", at());

        assert_eq!(result.analysis_mode, AnalysisMode::Full);
        assert_eq!(result.categories.environmental.score, 65);
        assert_eq!(result.confidence, 0.92);
        assert_eq!(result.keywords_found, vec!["+sustentável(3)"]);
    }

    #[test]
    fn test_misconduct_terms_lower_governance() {
        let analyzer = EsgAnalyzer::default();
        let doc = text_doc(
            "contrato.txt",
            "Durante a auditoria do fornecedor houve corrupção e fraude registradas no período.",
        );
        let result = analyzer.analyze_with(&doc, "c-2", at());

        // "auditoria" also matches "audit": 50 + 10 - 16
        assert_eq!(result.categories.governance.score, 44);
        assert_eq!(result.categories.governance.risks[0].level, RiskLevel::High);
    }

    #[test]
    fn test_empty_text_is_neutral() {
        let analyzer = EsgAnalyzer::default();
        let context = AnalysisContext {
            contract_id: "c-3".to_string(),
            file_name: "vazio.pdf".to_string(),
            size_bytes: 0,
            uploaded_at: at(),
        };
        let result = analyzer.analyze_text("", &context);

        assert_eq!(result.categories.scores(), [50, 50, 50]);
        assert_eq!(result.overall_score, 50);
        assert_eq!(result.compliance.status, ComplianceStatus::NonCompliant);
        assert!(result.keywords_found.is_empty());
    }

    #[test]
    fn test_short_text_takes_fallback_path() {
        let analyzer = EsgAnalyzer::default();
        let doc = text_doc("contrato.txt", "curto text");
        let result = analyzer.analyze_with(&doc, "c-4", at());

        assert_eq!(result.analysis_mode, AnalysisMode::Degraded);
        assert!(result.confidence < 0.92);
        // neutral name, tiny file: 50 + 5
        assert_eq!(result.categories.scores(), [55, 55, 55]);
    }

    #[test]
    fn test_same_text_different_identity() {
        let analyzer = EsgAnalyzer::default();
        let doc = text_doc(
            "contrato.txt",
            "Compromisso com energia limpa, comunidade local e transparência na gestão do contrato.",
        );
        let a = analyzer.analyze_with(&doc, "a", at());
        let b = analyzer.analyze_with(&doc, "b", at());

        assert_eq!(a.categories.scores(), b.categories.scores());
        assert_eq!(a.overall_score, b.overall_score);
        assert_ne!(a.contract_id, b.contract_id);
        assert_ne!(a.recommendations, b.recommendations);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let analyzer = EsgAnalyzer::default();
        let doc = text_doc(
            "relatorio.txt",
            "Vazamento de óleo contido. Auditoria independente e programa de segurança do trabalho.",
        );
        assert_eq!(
            analyzer.analyze_with(&doc, "same", at()),
            analyzer.analyze_with(&doc, "same", at())
        );
    }

    #[test]
    fn test_unreadable_pdf_uses_name_hint() {
        let analyzer = EsgAnalyzer::default();
        let doc = Document::new("Refinaria_Sul.pdf", b"%PDF-1.4\n\xff\xfe garbage".to_vec());
        let result = analyzer.analyze_with(&doc, "c-6", at());

        assert_eq!(result.analysis_mode, AnalysisMode::Degraded);
        assert_eq!(result.overall_score, 35);
        assert_eq!(result.confidence, 0.65);
    }

    #[test]
    fn test_custom_threshold() {
        let analyzer = EsgAnalyzer::new(
            Arc::new(KeywordLexicon::builtin()),
            AnalyzerConfig {
                min_text_chars: 5,
                ..AnalyzerConfig::default()
            },
        );
        let result = analyzer.analyze_with(&text_doc("a.txt", "energia limpa"), "c-7", at());
        assert_eq!(result.analysis_mode, AnalysisMode::Full);
        // "energia limpa" and "limpa"
        assert_eq!(result.categories.environmental.score, 60);
    }

    #[test]
    fn test_analyze_generates_identity() {
        let analyzer = EsgAnalyzer::default();
        let result = analyzer.analyze(&text_doc("a.txt", "x"));
        assert!(uuid::Uuid::parse_str(&result.contract_id).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: arbitrary bytes always produce a bounded result
        #[test]
        fn analysis_is_total(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let analyzer = EsgAnalyzer::default();
            let result = analyzer.analyze_with(&Document::new("doc.pdf", bytes), "p", at());
            prop_assert!(result.overall_score <= 100);
            for score in result.categories.scores() {
                prop_assert!(score <= 100);
            }
            prop_assert!(!result.risks.is_empty());
        }
    }
}
