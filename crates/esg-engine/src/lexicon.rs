//! Curated ESG keyword lists and the lexicon that holds them
//!
//! Terms are lowercase and matched as plain substrings, so accented and
//! unaccented spellings are listed separately.

use std::path::Path;

use esg_types::Category;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environmental terms that indicate good practice
pub const ENVIRONMENTAL_POSITIVE: &[&str] = &[
    "sustentavel",
    "sustentável",
    "neutralidade",
    "carbono",
    "renovavel",
    "renovável",
    "iso 14001",
    "biodiversidade",
    "conservacao",
    "conservação",
    "zero vazamento",
    "energia limpa",
    "certificacao",
    "certificação",
    "monitoramento ambiental",
    "mitigacao",
    "mitigação",
    "recuperacao",
    "recuperação",
    "preservacao",
    "preservação",
    "verde",
    "clean",
    "sustain",
    "environmental",
    "climate",
    "emission",
    "carbon neutral",
    "ambiental",
    "ecologico",
    "ecológico",
    "limpa",
    "renovaveis",
    "renováveis",
];

/// Environmental terms that indicate incidents or liabilities
pub const ENVIRONMENTAL_NEGATIVE: &[&str] = &[
    "acidente",
    "vazamento",
    "contaminacao",
    "contaminação",
    "multa ambiental",
    "pendente",
    "incompleto",
    "violacao",
    "violação",
    "impacto negativo",
    "degradacao",
    "degradação",
    "poluicao",
    "poluição",
    "derramamento",
    "spill",
    "toxic",
    "pollution",
    "contamination",
    "violation",
    "damage",
    "incident",
];

/// Social terms that indicate community and workforce engagement
pub const SOCIAL_POSITIVE: &[&str] = &[
    "comunidade",
    "local",
    "indigena",
    "indígena",
    "consulta previa",
    "consulta prévia",
    "capacitacao",
    "capacitação",
    "educacao",
    "educação",
    "saude",
    "saúde",
    "diversidade",
    "inclusao",
    "inclusão",
    "direitos humanos",
    "engajamento",
    "social",
    "community",
    "training",
    "health",
    "safety",
    "workforce",
    "indigenous",
    "trabalho",
    "emprego",
    "seguranca",
    "segurança",
    "bem-estar",
];

/// Social terms that indicate conflict or rights issues
pub const SOCIAL_NEGATIVE: &[&str] = &[
    "conflito",
    "protesto",
    "oposicao",
    "oposição",
    "resistencia",
    "resistência",
    "reassentamento",
    "remocao",
    "remoção",
    "terceirizacao",
    "terceirização",
    "irregularidade",
    "violacao direitos",
    "violação direitos",
    "conflict",
    "protest",
    "opposition",
    "resistance",
    "violation",
    "irregular",
    "displacement",
];

/// Governance terms that indicate oversight and transparency
pub const GOVERNANCE_POSITIVE: &[&str] = &[
    "transparencia",
    "transparência",
    "auditoria",
    "compliance",
    "governanca",
    "governança",
    "etica",
    "ética",
    "prestacao",
    "prestação",
    "independente",
    "comite",
    "comitê",
    "governance",
    "ethics",
    "transparency",
    "audit",
    "independent",
    "committee",
    "gestao",
    "gestão",
    "controle",
    "supervisao",
    "supervisão",
];

/// Governance terms that indicate misconduct
pub const GOVERNANCE_NEGATIVE: &[&str] = &[
    "ressalva",
    "irregularidade",
    "denuncia",
    "denúncia",
    "corrupcao",
    "corrupção",
    "falta transparencia",
    "falta transparência",
    "nao conformidade",
    "não conformidade",
    "fraud",
    "corruption",
    "irregularity",
    "non-compliance",
    "violation",
    "breach",
];

lazy_static! {
    /// Built-in lexicon, shared by every analysis in the process
    pub static ref DEFAULT_LEXICON: KeywordLexicon = KeywordLexicon::builtin();
}

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Empty term at {category}.{sign}[{index}]")]
    EmptyTerm {
        category: Category,
        sign: &'static str,
        index: usize,
    },

    #[error("Failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid lexicon JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Positive and negative terms for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTerms {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

impl CategoryTerms {
    fn from_static(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: positive.iter().map(|t| t.to_string()).collect(),
            negative: negative.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn normalized(self, category: Category) -> Result<Self, LexiconError> {
        Ok(Self {
            positive: normalize_terms(self.positive, category, "positive")?,
            negative: normalize_terms(self.negative, category, "negative")?,
        })
    }
}

fn normalize_terms(
    terms: Vec<String>,
    category: Category,
    sign: &'static str,
) -> Result<Vec<String>, LexiconError> {
    terms
        .into_iter()
        .enumerate()
        .map(|(index, term)| {
            let term = term.trim().to_lowercase();
            if term.is_empty() {
                Err(LexiconError::EmptyTerm {
                    category,
                    sign,
                    index,
                })
            } else {
                Ok(term)
            }
        })
        .collect()
}

/// Immutable keyword configuration. Only constructible through validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordLexicon {
    environmental: CategoryTerms,
    social: CategoryTerms,
    governance: CategoryTerms,
}

#[derive(Deserialize)]
struct LexiconFile {
    environmental: CategoryTerms,
    social: CategoryTerms,
    governance: CategoryTerms,
}

impl KeywordLexicon {
    /// Validate and normalize (trim, lowercase) the given term lists
    pub fn new(
        environmental: CategoryTerms,
        social: CategoryTerms,
        governance: CategoryTerms,
    ) -> Result<Self, LexiconError> {
        Ok(Self {
            environmental: environmental.normalized(Category::Environmental)?,
            social: social.normalized(Category::Social)?,
            governance: governance.normalized(Category::Governance)?,
        })
    }

    /// The curated Portuguese/English term lists
    pub fn builtin() -> Self {
        Self {
            environmental: CategoryTerms::from_static(
                ENVIRONMENTAL_POSITIVE,
                ENVIRONMENTAL_NEGATIVE,
            ),
            social: CategoryTerms::from_static(SOCIAL_POSITIVE, SOCIAL_NEGATIVE),
            governance: CategoryTerms::from_static(GOVERNANCE_POSITIVE, GOVERNANCE_NEGATIVE),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Self::new(file.environmental, file.social, file.governance)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn terms(&self, category: Category) -> &CategoryTerms {
        match category {
            Category::Environmental => &self.environmental,
            Category::Social => &self.social,
            Category::Governance => &self.governance,
        }
    }

    pub fn term_count(&self) -> usize {
        Category::ALL
            .iter()
            .map(|&c| {
                let terms = self.terms(c);
                terms.positive.len() + terms.negative.len()
            })
            .sum()
    }
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        DEFAULT_LEXICON.clone()
    }
}
