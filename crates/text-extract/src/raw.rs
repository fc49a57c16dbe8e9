//! Last-resort scan of raw bytes for readable ASCII

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Anything that is not a word character, whitespace or common punctuation
    static ref NON_TEXT: Regex = Regex::new(r"[^\w\s\-.,:;!?()]").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Keep printable ASCII plus CR/LF, blank out symbols, collapse whitespace.
pub fn scan_printable(data: &[u8]) -> String {
    let printable: String = data
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || b == b'\n' || b == b'\r')
        .map(|&b| b as char)
        .collect();

    let cleaned = NON_TEXT.replace_all(&printable, " ");
    WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_drops_binary_and_collapses_whitespace() {
        let data = b"\x00\x01Audit\xff\xfe   report\n\n\rclean\x7f";
        assert_eq!(scan_printable(data), "Audit report clean");
    }

    #[test]
    fn test_symbols_become_spaces() {
        assert_eq!(scan_printable(b"<<carbon/neutral>>"), "carbon neutral");
    }

    #[test]
    fn test_keeps_sentence_punctuation() {
        assert_eq!(
            scan_printable(b"Safety first: training (annual), audit!"),
            "Safety first: training (annual), audit!"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(scan_printable(b""), "");
    }
}
