//! Result synthesis: turn scores and keyword evidence into a full report
//!
//! Everything here is pure construction. Ids are derived from the contract
//! id, so identical inputs always produce identical results.

use esg_types::{
    AnalysisMode, AnalysisResult, Categories, Category, CategoryResult, Finding, Recommendation,
    Risk, RiskLevel, Scope, Sentiment,
};

use crate::compliance;
use crate::scanner::{KeywordTally, SignCounts};
use crate::scoring::CategoryScores;
use crate::AnalysisContext;

/// Categories below this score get a recommendation
pub const RECOMMENDATION_THRESHOLD: u8 = 80;

const CONTENT_SOURCE: &str = "Content Analysis";
const FALLBACK_SOURCE: &str = "Fallback Analysis";

/// What the scores were derived from
#[derive(Debug, Clone, Copy)]
pub enum Evidence<'a> {
    /// Keyword scan of extracted text
    Keywords(&'a KeywordTally),
    /// File name and size only
    Limited,
}

impl Evidence<'_> {
    fn mode(&self) -> AnalysisMode {
        match self {
            Evidence::Keywords(_) => AnalysisMode::Full,
            Evidence::Limited => AnalysisMode::Degraded,
        }
    }
}

/// Portuguese label used in user-facing text
pub fn category_label(category: Category) -> &'static str {
    match category {
        Category::Environmental => "ambiental",
        Category::Social => "social",
        Category::Governance => "governança",
    }
}

/// ≥70 low, ≥50 medium, ≥30 high, otherwise critical
pub fn risk_level(score: u8) -> RiskLevel {
    match score {
        70..=u8::MAX => RiskLevel::Low,
        50..=69 => RiskLevel::Medium,
        30..=49 => RiskLevel::High,
        _ => RiskLevel::Critical,
    }
}

fn level_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "baixo",
        RiskLevel::Medium => "médio",
        RiskLevel::High => "alto",
        RiskLevel::Critical => "crítico",
    }
}

fn risk_probability(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => 0.2,
        RiskLevel::Medium => 0.4,
        RiskLevel::High => 0.7,
        RiskLevel::Critical => 0.9,
    }
}

fn risk_mitigation(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "Monitoramento regular",
        RiskLevel::Medium => "Ações preventivas",
        RiskLevel::High | RiskLevel::Critical => "Intervenção urgente",
    }
}

fn timeline(priority: RiskLevel) -> &'static str {
    match priority {
        RiskLevel::Critical => "30 dias",
        RiskLevel::High => "60 dias",
        RiskLevel::Medium => "90 dias",
        RiskLevel::Low => "90+ dias",
    }
}

/// Assemble the final result
pub fn synthesize(
    context: &AnalysisContext,
    scores: CategoryScores,
    evidence: Evidence<'_>,
    confidence: f64,
) -> AnalysisResult {
    let overall = scores.overall();
    let keywords_found = match evidence {
        Evidence::Keywords(tally) => tally.trace(),
        Evidence::Limited => Vec::new(),
    };

    let category_result = |category: Category| {
        build_category(context, category, scores.get(category), evidence, confidence)
    };
    let categories = Categories {
        environmental: category_result(Category::Environmental),
        social: category_result(Category::Social),
        governance: category_result(Category::Governance),
    };

    let mut risks: Vec<Risk> = Category::ALL
        .iter()
        .flat_map(|&c| categories.get(c).risks.iter())
        .filter(|r| r.level >= RiskLevel::Medium)
        .cloned()
        .collect();
    risks.push(overall_risk(&context.contract_id, overall));

    let mut recommendations = category_recommendations(&context.contract_id, &scores);
    if matches!(evidence, Evidence::Limited) {
        recommendations.push(Recommendation {
            id: format!("{}-rec-fallback", context.contract_id),
            category: Scope::Overall,
            priority: RiskLevel::Medium,
            title: "Melhorar análise de conteúdo".to_string(),
            description: "Não foi possível ler completamente o conteúdo do documento"
                .to_string(),
            action: "Tentar novamente com PDF otimizado ou usar formato alternativo".to_string(),
            timeline: "Próxima análise".to_string(),
        });
    }

    let compliance = compliance::assess(
        &context.contract_id,
        &scores,
        keywords_found.len(),
        matches!(evidence, Evidence::Limited),
    );

    AnalysisResult {
        contract_id: context.contract_id.clone(),
        file_name: context.file_name.clone(),
        upload_date: context.uploaded_at,
        overall_score: overall,
        confidence,
        analysis_mode: evidence.mode(),
        categories,
        risks,
        recommendations,
        compliance,
        keywords_found,
    }
}

fn build_category(
    context: &AnalysisContext,
    category: Category,
    score: u8,
    evidence: Evidence<'_>,
    confidence: f64,
) -> CategoryResult {
    let (findings, strengths, weaknesses) = match evidence {
        Evidence::Keywords(tally) => {
            let counts = tally.counts(category);
            (
                vec![content_finding(category, counts)],
                strengths(counts.positive),
                weaknesses(counts.negative),
            )
        }
        Evidence::Limited => limited_texts(category, &context.file_name, confidence),
    };

    CategoryResult {
        score,
        findings,
        risks: vec![category_risk(&context.contract_id, category, score, evidence)],
        strengths,
        weaknesses,
    }
}

fn content_finding(category: Category, counts: SignCounts) -> Finding {
    let label = category_label(category);
    let (text, confidence, sentiment) = if counts.positive > counts.negative {
        (
            format!(
                "Análise do documento: {} indicadores positivos encontrados para {}",
                counts.positive, label
            ),
            0.90,
            Sentiment::Positive,
        )
    } else if counts.negative > counts.positive {
        (
            format!(
                "Análise do documento: {} indicadores negativos identificados para {}",
                counts.negative, label
            ),
            0.88,
            Sentiment::Negative,
        )
    } else {
        (
            format!("Análise do documento: indicadores equilibrados para {}", label),
            0.75,
            Sentiment::Neutral,
        )
    };

    Finding {
        text,
        category: CONTENT_SOURCE.to_string(),
        confidence,
        sentiment,
    }
}

fn strengths(count: u32) -> Vec<String> {
    match count {
        0 => vec!["Estrutura mínima presente".to_string()],
        1..=2 => vec![format!("Indicadores básicos presentes ({})", count)],
        3..=5 => vec![
            format!("Alguns indicadores positivos ({})", count),
            "Base sólida identificada".to_string(),
        ],
        _ => vec![
            format!("Múltiplos indicadores positivos encontrados ({})", count),
            "Práticas exemplares identificadas".to_string(),
        ],
    }
}

fn weaknesses(count: u32) -> Vec<String> {
    match count {
        0 => vec!["Margem para melhorias".to_string()],
        1..=2 => vec![format!("Pontos de melhoria identificados ({})", count)],
        3..=5 => vec![
            format!("Alguns problemas encontrados ({})", count),
            "Necessita atenção".to_string(),
        ],
        _ => vec![
            format!("Múltiplos problemas identificados ({})", count),
            "Situação crítica documentada".to_string(),
        ],
    }
}

fn limited_texts(
    category: Category,
    file_name: &str,
    confidence: f64,
) -> (Vec<Finding>, Vec<String>, Vec<String>) {
    let (finding, strength, weakness) = match category {
        Category::Environmental => (
            format!(
                "Análise limitada baseada no nome do arquivo: {}",
                file_name
            ),
            "Análise básica realizada",
            "Análise limitada - não foi possível ler o conteúdo do documento",
        ),
        Category::Social => (
            "Análise social limitada baseada em características do arquivo".to_string(),
            "Estrutura básica analisada",
            "Análise social limitada",
        ),
        Category::Governance => (
            "Análise de governança limitada baseada em metadados".to_string(),
            "Informações básicas processadas",
            "Análise de governança superficial",
        ),
    };

    (
        vec![Finding {
            text: finding,
            category: FALLBACK_SOURCE.to_string(),
            confidence,
            sentiment: Sentiment::Neutral,
        }],
        vec![strength.to_string()],
        vec![weakness.to_string()],
    )
}

fn category_risk(
    contract_id: &str,
    category: Category,
    score: u8,
    evidence: Evidence<'_>,
) -> Risk {
    let level = risk_level(score);
    let basis = match evidence {
        Evidence::Keywords(_) => "análise do conteúdo",
        Evidence::Limited => "análise limitada do arquivo",
    };

    Risk {
        id: format!("{}-risk-{}", contract_id, category),
        level,
        category: Scope::from(category),
        description: format!(
            "Risco {} {} baseado na {} (score: {})",
            level_label(level),
            category_label(category),
            basis,
            score
        ),
        impact: level,
        mitigation: risk_mitigation(level).to_string(),
        probability: Some(risk_probability(level)),
    }
}

fn overall_risk(contract_id: &str, overall: u8) -> Risk {
    let (level, probability, mitigation) = match overall {
        70..=u8::MAX => (RiskLevel::Low, 0.15, "Acompanhamento regular"),
        50..=69 => (RiskLevel::Medium, 0.45, "Monitoramento próximo"),
        _ => (RiskLevel::High, 0.75, "Ação imediata necessária"),
    };

    Risk {
        id: format!("{}-risk-overall", contract_id),
        level,
        category: Scope::Overall,
        description: format!(
            "Risco geral baseado na análise completa do documento (score: {})",
            overall
        ),
        impact: level,
        mitigation: mitigation.to_string(),
        probability: Some(probability),
    }
}

fn category_recommendations(contract_id: &str, scores: &CategoryScores) -> Vec<Recommendation> {
    Category::ALL
        .iter()
        .filter(|&&c| scores.get(c) < RECOMMENDATION_THRESHOLD)
        .map(|&category| {
            let score = scores.get(category);
            let priority = risk_level(score);
            let (title, action) = match category {
                Category::Environmental => (
                    "Melhorar práticas ambientais",
                    "Implementar práticas sustentáveis identificadas na análise",
                ),
                Category::Social => (
                    "Fortalecer engajamento social",
                    "Desenvolver programas sociais identificados como necessários",
                ),
                Category::Governance => (
                    "Aprimorar governança",
                    "Implementar estruturas de governança identificadas como ausentes",
                ),
            };

            Recommendation {
                id: format!("{}-rec-{}", contract_id, category),
                category: Scope::from(category),
                priority,
                title: title.to_string(),
                description: format!(
                    "Score {} abaixo do esperado ({})",
                    category_label(category),
                    score
                ),
                action: action.to_string(),
                timeline: timeline(priority).to_string(),
            }
        })
        .collect()
}
