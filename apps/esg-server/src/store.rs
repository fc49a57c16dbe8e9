//! In-memory registry of analyzed contracts

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use esg_types::{
    AnalysisMode, AnalysisResult, Category, ComplianceStatus, RiskLevel, Scope,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Listing entry for one analyzed contract
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSummary {
    pub id: String,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub overall_score: u8,
    pub risk_level: RiskLevel,
    pub compliance_status: ComplianceStatus,
    pub analysis_mode: AnalysisMode,
    /// SHA-256 of the uploaded bytes, hex encoded
    pub document_hash: String,
}

impl ContractSummary {
    pub fn new(result: &AnalysisResult, document_hash: String) -> Self {
        Self {
            id: result.contract_id.clone(),
            file_name: result.file_name.clone(),
            upload_date: result.upload_date,
            overall_score: result.overall_score,
            risk_level: result.worst_risk().unwrap_or(RiskLevel::Low),
            compliance_status: result.compliance.status,
            analysis_mode: result.analysis_mode,
            document_hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopRisk {
    pub category: Scope,
    pub count: usize,
    pub level: RiskLevel,
}

/// Aggregates over every stored contract
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_contracts: usize,
    pub average_score: f64,
    pub risks_identified: usize,
    /// Percentage of contracts that are not NON_COMPLIANT
    pub compliance_rate: f64,
    pub top_risks: Vec<TopRisk>,
}

/// Default number of analyses kept before the oldest are evicted
pub const DEFAULT_MAX_CONTRACTS: usize = 10_000;

struct StoredContract {
    seq: u64,
    summary: ContractSummary,
    result: AnalysisResult,
}

#[derive(Default)]
struct Inner {
    by_id: HashMap<String, StoredContract>,
    /// insertion sequence -> contract id, oldest first
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

/// Analyzed contracts keyed by id, bounded to `capacity` entries
pub struct ContractStore {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl Default for ContractStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_CONTRACTS)
    }
}

impl ContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Store a result, replacing any earlier analysis with the same id.
    ///
    /// When the store is full the least recently inserted contract is evicted.
    pub async fn insert(&self, result: AnalysisResult, document_hash: String) -> ContractSummary {
        let summary = ContractSummary::new(&result, document_hash);
        let mut inner = self.inner.write().await;

        let seq = inner.next_seq;
        inner.next_seq += 1;

        if let Some(previous) = inner.by_id.remove(&summary.id) {
            inner.order.remove(&previous.seq);
        }
        inner.order.insert(seq, summary.id.clone());
        inner.by_id.insert(
            summary.id.clone(),
            StoredContract {
                seq,
                summary: summary.clone(),
                result,
            },
        );

        while inner.by_id.len() > self.capacity {
            let Some((_, oldest)) = inner.order.pop_first() else {
                break;
            };
            inner.by_id.remove(&oldest);
            debug!("Evicted contract {} from store", oldest);
        }

        summary
    }

    pub async fn get(&self, id: &str) -> Option<AnalysisResult> {
        self.inner
            .read()
            .await
            .by_id
            .get(id)
            .map(|c| c.result.clone())
    }

    /// Summaries, newest upload first
    pub async fn list(&self) -> Vec<ContractSummary> {
        let inner = self.inner.read().await;
        let mut summaries: Vec<ContractSummary> = inner
            .order
            .values()
            .rev()
            .filter_map(|id| inner.by_id.get(id))
            .map(|c| c.summary.clone())
            .collect();
        // stable sort keeps later inserts first among equal timestamps
        summaries.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        summaries
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn dashboard(&self) -> DashboardMetrics {
        let inner = self.inner.read().await;
        let results: Vec<&AnalysisResult> = inner.by_id.values().map(|c| &c.result).collect();
        dashboard_metrics(&results)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn dashboard_metrics(results: &[&AnalysisResult]) -> DashboardMetrics {
    let total = results.len();
    if total == 0 {
        return DashboardMetrics {
            total_contracts: 0,
            average_score: 0.0,
            risks_identified: 0,
            compliance_rate: 0.0,
            top_risks: Vec::new(),
        };
    }

    let score_sum: u64 = results.iter().map(|r| u64::from(r.overall_score)).sum();
    let risks_identified = results
        .iter()
        .flat_map(|r| r.risks.iter())
        .filter(|risk| risk.level >= RiskLevel::Medium)
        .count();
    let compliant = results
        .iter()
        .filter(|r| r.compliance.status != ComplianceStatus::NonCompliant)
        .count();

    let mut by_category: BTreeMap<Category, (usize, RiskLevel)> = BTreeMap::new();
    for result in results {
        for category in Category::ALL {
            for risk in &result.categories.get(category).risks {
                if risk.level < RiskLevel::Medium {
                    continue;
                }
                let entry = by_category.entry(category).or_insert((0, risk.level));
                entry.0 += 1;
                entry.1 = entry.1.max(risk.level);
            }
        }
    }
    let mut top_risks: Vec<TopRisk> = by_category
        .into_iter()
        .map(|(category, (count, level))| TopRisk {
            category: Scope::from(category),
            count,
            level,
        })
        .collect();
    top_risks.sort_by(|a, b| b.count.cmp(&a.count).then(b.level.cmp(&a.level)));

    DashboardMetrics {
        total_contracts: total,
        average_score: round1(score_sum as f64 / total as f64),
        risks_identified,
        compliance_rate: round1(compliant as f64 * 100.0 / total as f64),
        top_risks,
    }
}
