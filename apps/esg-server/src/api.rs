//! API handlers for the ESG server
//!
//! Provides REST endpoints for:
//! - Contract upload and analysis
//! - Contract listing and lookup
//! - Dashboard metrics and the framework catalog

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use esg_engine::{Document, FRAMEWORKS};
use esg_types::{AnalysisResult, Category};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::store::{ContractSummary, DashboardMetrics};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "esg-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Upload body: document bytes as base64
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub file_name: String,
    pub data: String,
    pub contract_id: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub result: AnalysisResult,
}

/// Handler: POST /api/contracts/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let file_name = req.file_name.trim().to_string();
    if file_name.is_empty() {
        return Err(ServerError::InvalidRequest("fileName must not be empty".into()));
    }

    let bytes = STANDARD
        .decode(req.data.trim())
        .map_err(|e| ServerError::InvalidRequest(format!("data is not valid base64: {}", e)))?;
    if bytes.len() > state.max_upload_bytes {
        return Err(ServerError::PayloadTooLarge {
            size: bytes.len(),
            limit: state.max_upload_bytes,
        });
    }

    let contract_id = match req.contract_id {
        Some(id) if id.trim().is_empty() => {
            return Err(ServerError::InvalidRequest("contractId must not be empty".into()));
        }
        Some(id) => id.trim().to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    };

    info!(
        "Analyze request: contract={}, file={}, bytes={}",
        contract_id,
        file_name,
        bytes.len()
    );

    let document_hash = hex::encode(Sha256::digest(&bytes));
    let document = Document::new(file_name, bytes);

    let analyzer = state.analyzer.clone();
    let permits = state.permits.clone();
    let uploaded_at = Utc::now();
    let task_id = contract_id.clone();
    // Waiting for a permit counts against the timeout. The permit lives in the
    // blocking task and is released only when the analysis itself ends.
    let outcome = tokio::time::timeout(Duration::from_millis(state.timeout_ms), async move {
        let permit = permits
            .acquire_owned()
            .await
            .map_err(|e| ServerError::Internal(format!("Analysis queue closed: {}", e)))?;
        debug!("Acquired analysis permit for {}", task_id);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            analyzer.analyze_with(&document, task_id, uploaded_at)
        })
        .await
        .map_err(|e| ServerError::Internal(format!("Analysis task failed: {}", e)))
    })
    .await;

    let result = match outcome {
        Ok(result) => result?,
        Err(_timeout) => {
            warn!("Analysis of {} timed out", contract_id);
            return Err(ServerError::Timeout(state.timeout_ms));
        }
    };

    state.store.insert(result.clone(), document_hash).await;

    Ok(Json(AnalyzeResponse {
        success: true,
        result,
    }))
}

#[derive(Serialize)]
pub struct ContractListResponse {
    pub success: bool,
    pub contracts: Vec<ContractSummary>,
    pub count: usize,
}

/// Handler: GET /api/contracts
pub async fn handle_list_contracts(State(state): State<AppState>) -> Json<ContractListResponse> {
    let contracts = state.store.list().await;
    let count = contracts.len();

    Json(ContractListResponse {
        success: true,
        contracts,
        count,
    })
}

/// Handler: GET /api/contracts/:id
pub async fn handle_get_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let result = state
        .store
        .get(&id)
        .await
        .ok_or(ServerError::NotFound(id))?;

    Ok(Json(AnalyzeResponse {
        success: true,
        result,
    }))
}

/// Handler: GET /api/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardMetrics> {
    Json(state.store.dashboard().await)
}

#[derive(Serialize)]
pub struct FrameworkInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub categories: Vec<Category>,
    pub threshold: u8,
}

#[derive(Serialize)]
pub struct FrameworkListResponse {
    pub success: bool,
    pub frameworks: Vec<FrameworkInfo>,
    pub count: usize,
}

/// Handler: GET /api/frameworks
pub async fn handle_list_frameworks() -> Json<FrameworkListResponse> {
    let frameworks: Vec<FrameworkInfo> = FRAMEWORKS
        .iter()
        .map(|fw| FrameworkInfo {
            id: fw.id,
            name: fw.name,
            description: fw.description,
            categories: fw.categories.to_vec(),
            threshold: fw.threshold,
        })
        .collect();
    let count = frameworks.len();

    Json(FrameworkListResponse {
        success: true,
        frameworks,
        count,
    })
}
