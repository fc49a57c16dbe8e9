pub mod types;

pub use types::{
    AnalysisMode, AnalysisResult, Categories, Category, CategoryResult, ComplianceIssue,
    ComplianceResult, ComplianceStatus, Finding, FrameworkAssessment, Recommendation, Risk,
    RiskLevel, Scope, Sentiment,
};
