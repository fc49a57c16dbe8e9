//! Compliance estimates against ESG reporting frameworks
//!
//! Framework sub-scores are fixed fractions of the category scores they
//! draw on. These are calibration constants, not derived from the
//! frameworks themselves.

use std::collections::BTreeMap;

use esg_types::{
    Category, ComplianceIssue, ComplianceResult, ComplianceStatus, FrameworkAssessment, RiskLevel,
    Scope,
};

use crate::scoring::CategoryScores;
use crate::synthesizer::category_label;

pub const COMPLIANT_THRESHOLD: f64 = 80.0;
pub const PARTIAL_THRESHOLD: f64 = 60.0;

/// Categories scoring below this get an issue when the contract is non-compliant
const ISSUE_THRESHOLD: u8 = 60;

/// A reporting framework and how its sub-score is estimated
#[derive(Debug, Clone, Copy)]
pub struct Framework {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub categories: &'static [Category],
    pub multiplier: f64,
    pub threshold: u8,
    pub detail: &'static str,
}

pub const FRAMEWORKS: &[Framework] = &[
    Framework {
        id: "gri",
        name: "GRI Standards",
        description: "Global Reporting Initiative sustainability reporting",
        categories: &[
            Category::Environmental,
            Category::Social,
            Category::Governance,
        ],
        multiplier: 0.95,
        threshold: 70,
        detail: "indicadores ESG encontrados no documento",
    },
    Framework {
        id: "sasb",
        name: "SASB",
        description: "Sustainability Accounting Standards Board, oil & gas metrics",
        categories: &[Category::Environmental, Category::Governance],
        multiplier: 0.92,
        threshold: 70,
        detail: "Métricas identificadas no documento analisado",
    },
    Framework {
        id: "tcfd",
        name: "TCFD",
        description: "Task Force on Climate-related Financial Disclosures",
        categories: &[Category::Environmental],
        multiplier: 0.88,
        threshold: 65,
        detail: "Análise de riscos climáticos baseada no conteúdo do contrato",
    },
    Framework {
        id: "ipieca",
        name: "IPIECA",
        description: "Oil and gas industry environmental and social guidance",
        categories: &[Category::Environmental, Category::Social],
        multiplier: 0.94,
        threshold: 70,
        detail: "Práticas setoriais identificadas na análise",
    },
];

impl Framework {
    pub fn score(&self, scores: &CategoryScores) -> u8 {
        let sum: f64 = self
            .categories
            .iter()
            .map(|&c| f64::from(scores.get(c)))
            .sum();
        let mean = sum / self.categories.len() as f64;
        (mean * self.multiplier).round().clamp(0.0, 100.0) as u8
    }
}

/// Overall status from the exact mean of the category scores
pub fn status_for_mean(mean: f64) -> ComplianceStatus {
    if mean >= COMPLIANT_THRESHOLD {
        ComplianceStatus::Compliant
    } else if mean >= PARTIAL_THRESHOLD {
        ComplianceStatus::PartiallyCompliant
    } else {
        ComplianceStatus::NonCompliant
    }
}

/// Build the compliance block. `limited` marks a result from the fallback path.
pub fn assess(
    contract_id: &str,
    scores: &CategoryScores,
    keywords_found: usize,
    limited: bool,
) -> ComplianceResult {
    let mean = scores.mean();

    let frameworks: BTreeMap<String, FrameworkAssessment> = FRAMEWORKS
        .iter()
        .map(|fw| {
            let score = fw.score(scores);
            let compliant = score >= fw.threshold;

            let mut details = Vec::new();
            if limited {
                details.push(
                    "Análise limitada - documento não foi completamente processado".to_string(),
                );
            } else if fw.id == "gri" {
                details.push(format!("{} {}", keywords_found, fw.detail));
            } else {
                details.push(fw.detail.to_string());
            }
            if !compliant {
                details.push(format!(
                    "Score {} abaixo do mínimo de {} para {}",
                    score, fw.threshold, fw.name
                ));
            }

            (
                fw.id.to_string(),
                FrameworkAssessment {
                    score,
                    compliant,
                    details,
                },
            )
        })
        .collect();

    let mut issues: Vec<ComplianceIssue> = if mean < PARTIAL_THRESHOLD {
        Category::ALL
            .iter()
            .filter(|&&c| scores.get(c) < ISSUE_THRESHOLD)
            .map(|&c| {
                let score = scores.get(c);
                ComplianceIssue {
                    id: format!("{}-issue-{}", contract_id, c),
                    severity: if score < 30 {
                        RiskLevel::Critical
                    } else {
                        RiskLevel::High
                    },
                    category: Scope::from(c),
                    description: format!(
                        "Não conformidades identificadas na dimensão {} (score: {})",
                        category_label(c),
                        score
                    ),
                    recommendation: format!(
                        "Revisão completa das práticas de {}",
                        category_label(c)
                    ),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    if limited && !issues.is_empty() {
        issues.push(ComplianceIssue {
            id: format!("{}-issue-technical", contract_id),
            severity: RiskLevel::Medium,
            category: Scope::Technical,
            description: "Documento não foi completamente processado".to_string(),
            recommendation: "Tentar novamente com arquivo otimizado".to_string(),
        });
    }

    ComplianceResult {
        status: status_for_mean(mean),
        frameworks,
        issues,
    }
}
