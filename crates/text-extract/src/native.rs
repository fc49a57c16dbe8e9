//! Per-page extraction backend using lopdf content streams
//!
//! Decodes text-showing operators directly, trying UTF-8, then UTF-16BE,
//! then Latin-1 for each string operand.

use super::types::*;
use lopdf::{Document, Object};

/// Backend that walks page content streams with lopdf
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBackend for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Lopdf
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        super::looks_like_pdf(data)
    }

    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let doc =
            Document::load_mem(data).map_err(|e| ExtractionError::ParseError(e.to_string()))?;
        Ok(extract_from_document(&doc))
    }
}

fn extract_from_document(doc: &Document) -> Vec<String> {
    let mut pages = Vec::new();

    for (_, page_id) in doc.get_pages() {
        let mut page_text = String::new();

        if let Ok(content) = doc.get_page_content(page_id) {
            if let Ok(decoded) = lopdf::content::Content::decode(&content) {
                for op in decoded.operations {
                    match op.operator.as_str() {
                        "Tj" | "TJ" | "'" | "\"" => {
                            for operand in &op.operands {
                                if let Some(text) = decode_operand(operand) {
                                    page_text.push_str(&text);
                                }
                            }
                            page_text.push(' ');
                        }
                        "T*" | "Td" | "TD" | "ET" => {
                            if !page_text.ends_with('\n') && !page_text.is_empty() {
                                page_text.push('\n');
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        pages.push(page_text);
    }

    pages
}

fn decode_operand(operand: &Object) -> Option<String> {
    match operand {
        Object::String(bytes, _) => Some(decode_string_bytes(bytes)),
        Object::Array(items) => {
            let mut text = String::new();
            for item in items {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode_string_bytes(bytes)),
                    // Large negative kerning usually marks a word gap
                    Object::Integer(n) if *n < -100 => text.push(' '),
                    Object::Real(n) if *n < -100.0 => text.push(' '),
                    _ => {}
                }
            }
            Some(text)
        }
        _ => None,
    }
}

fn decode_string_bytes(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{content::Content, content::Operation, Dictionary, Stream, StringFormat};

    fn create_test_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut page_ids = Vec::new();

        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                    ),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            text.as_bytes().to_vec(),
                            StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(page_ids.len() as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    /// One page that only paints an image XObject
    fn create_image_only_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            Dictionary::from_iter(vec![
                ("Type", Object::Name(b"XObject".to_vec())),
                ("Subtype", Object::Name(b"Image".to_vec())),
                ("Width", Object::Integer(1)),
                ("Height", Object::Integer(1)),
                ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
            ]),
            vec![0x80],
        ));
        let content = Content {
            operations: vec![
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
            ],
        };
        let content_id =
            doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let resources = Dictionary::from_iter(vec![(
            "XObject",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "Im0",
                Object::Reference(image_id),
            )])),
        )]);
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]));

        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Count", Object::Integer(1)),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
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

    #[test]
    fn test_image_only_pdf_yields_no_text() {
        let pdf = create_image_only_pdf();
        let extracted = crate::extract_text(&pdf);

        // the raw bytes are PDF syntax and must not pass as document text
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.method, ExtractionMethod::None);
        assert_eq!(extracted.page_count, Some(1));
        assert!(!extracted.is_meaningful(50));
        assert!(extracted
            .warnings
            .iter()
            .any(|w| w.contains("no text layer")));
    }

    #[test]
    fn test_text_layer_pdf_through_default_chain() {
        let pdf = create_test_pdf(&["Auditoria independente e energia limpa"]);
        let extracted = crate::extract_text(&pdf);

        assert!(!extracted.is_fallback());
        assert!(extracted.text.contains("Auditoria independente e energia limpa"));
    }

    #[test]
    fn test_extracts_text_per_page() {
        let pdf = create_test_pdf(&["Auditoria independente", "Energia limpa"]);
        let pages = LopdfBackend::new().extract_pages(&pdf).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Auditoria independente"));
        assert!(pages[1].contains("Energia limpa"));
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let result = LopdfBackend::new().extract_pages(b"plain words, not a pdf");
        assert!(matches!(result, Err(ExtractionError::ParseError(_))));
    }

    #[test]
    fn test_decode_utf16be_string() {
        let bytes = [0xFE, 0xFF, 0x00, 0x53, 0x00, 0xE1];
        assert_eq!(decode_string_bytes(&bytes), "Sá");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xE7 alone is not valid UTF-8
        assert_eq!(decode_string_bytes(&[b'a', 0xE7, b'o']), "aço");
    }

    #[test]
    fn test_kerning_gap_inserts_space() {
        let operand = Object::Array(vec![
            Object::String(b"carbon".to_vec(), StringFormat::Literal),
            Object::Integer(-250),
            Object::String(b"neutral".to_vec(), StringFormat::Literal),
        ]);
        assert_eq!(decode_operand(&operand).as_deref(), Some("carbon neutral"));
    }
}
