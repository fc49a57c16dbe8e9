use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// The three ESG dimensions a contract is scored on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Environmental,
    Social,
    Governance,
}

impl Category {
    /// Fixed iteration order used everywhere results must be deterministic.
    pub const ALL: [Category; 3] = [
        Category::Environmental,
        Category::Social,
        Category::Governance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Environmental => "environmental",
            Category::Social => "social",
            Category::Governance => "governance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a risk, recommendation or compliance issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    Environmental,
    Social,
    Governance,
    Overall,
    Technical,
}

impl From<Category> for Scope {
    fn from(category: Category) -> Self {
        match category {
            Category::Environmental => Scope::Environmental,
            Category::Social => Scope::Social,
            Category::Governance => Scope::Governance,
        }
    }
}

/// Ordered from least to most severe, so `max()` yields the worst level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
}

/// Whether the result came from keyword analysis of the text or from the
/// name/size fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    Full,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub text: String,
    pub category: String, // Source of the finding, e.g. "Content Analysis"
    pub confidence: f64,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: String,
    pub level: RiskLevel,
    pub category: Scope,
    pub description: String,
    pub impact: RiskLevel,
    pub mitigation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub category: Scope,
    pub priority: RiskLevel,
    pub title: String,
    pub description: String,
    pub action: String,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    pub score: u8,
    pub findings: Vec<Finding>,
    pub risks: Vec<Risk>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categories {
    pub environmental: CategoryResult,
    pub social: CategoryResult,
    pub governance: CategoryResult,
}

impl Categories {
    pub fn get(&self, category: Category) -> &CategoryResult {
        match category {
            Category::Environmental => &self.environmental,
            Category::Social => &self.social,
            Category::Governance => &self.governance,
        }
    }

    /// Scores in `Category::ALL` order.
    pub fn scores(&self) -> [u8; 3] {
        [
            self.environmental.score,
            self.social.score,
            self.governance.score,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkAssessment {
    pub score: u8,
    pub compliant: bool,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceIssue {
    pub id: String,
    pub severity: RiskLevel,
    pub category: Scope,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub status: ComplianceStatus,
    pub frameworks: BTreeMap<String, FrameworkAssessment>, // Keyed by framework id ("gri", ...)
    pub issues: Vec<ComplianceIssue>,
}

/// Output of one analysis call. Immutable once built.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub contract_id: String,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub overall_score: u8,
    pub confidence: f64,
    pub analysis_mode: AnalysisMode,
    pub categories: Categories,
    pub risks: Vec<Risk>,
    pub recommendations: Vec<Recommendation>,
    pub compliance: ComplianceResult,
    pub keywords_found: Vec<String>, // "+term(count)" / "-term(count)"
}

impl AnalysisResult {
    /// Worst risk level in the flat risk list, if any.
    pub fn worst_risk(&self) -> Option<RiskLevel> {
        self.risks.iter().map(|r| r.level).max()
    }
}
