//! Keyword scanning: count lexicon terms in document text

use std::fmt;

use esg_types::Category;
use serde::{Deserialize, Serialize};

use crate::lexicon::KeywordLexicon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    fn symbol(&self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }
}

/// One lexicon term found in the text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub category: Category,
    pub sign: Sign,
    pub term: String,
    pub count: u32,
}

impl fmt::Display for KeywordMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}({})", self.sign.symbol(), self.term, self.count)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignCounts {
    pub positive: u32,
    pub negative: u32,
}

/// Per-category counts plus every individual match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTally {
    pub environmental: SignCounts,
    pub social: SignCounts,
    pub governance: SignCounts,
    pub matches: Vec<KeywordMatch>,
}

impl KeywordTally {
    pub fn counts(&self, category: Category) -> SignCounts {
        match category {
            Category::Environmental => self.environmental,
            Category::Social => self.social,
            Category::Governance => self.governance,
        }
    }

    fn counts_mut(&mut self, category: Category) -> &mut SignCounts {
        match category {
            Category::Environmental => &mut self.environmental,
            Category::Social => &mut self.social,
            Category::Governance => &mut self.governance,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// "+term(count)" / "-term(count)" strings in scan order
    pub fn trace(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.to_string()).collect()
    }
}

/// Count non-overlapping, case-insensitive substring occurrences of every
/// lexicon term. Pure function of `(text, lexicon)`.
pub fn scan(text: &str, lexicon: &KeywordLexicon) -> KeywordTally {
    let mut tally = KeywordTally::default();
    if text.is_empty() {
        return tally;
    }

    let text_lower = text.to_lowercase();

    for category in Category::ALL {
        let terms = lexicon.terms(category);
        for (sign, list) in [
            (Sign::Positive, &terms.positive),
            (Sign::Negative, &terms.negative),
        ] {
            for term in list {
                let count = text_lower.matches(term.as_str()).count() as u32;
                if count == 0 {
                    continue;
                }

                let counts = tally.counts_mut(category);
                match sign {
                    Sign::Positive => counts.positive += count,
                    Sign::Negative => counts.negative += count,
                }
                tally.matches.push(KeywordMatch {
                    category,
                    sign,
                    term: term.clone(),
                    count,
                });
            }
        }
    }

    tally
}
