//! ESG Contract Scoring Server
//!
//! Accepts contract documents (PDF or plain text, base64 encoded), scores
//! them on environmental, social and governance keyword evidence and keeps
//! the results in memory for listing and dashboard views.
//!
//! ## Architecture
//!
//! - Analysis runs on the blocking pool under a per-request timeout
//! - A semaphore bounds concurrent analyses
//! - Rate limiting via tower-governor
//! - Panics contained by the extractor are logged through `tracing`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use esg_engine::{AnalyzerConfig, EsgAnalyzer, KeywordLexicon, DEFAULT_LEXICON};
use tokio::sync::Semaphore;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod store;

use api::{
    handle_analyze, handle_dashboard, handle_get_contract, handle_health, handle_list_contracts,
    handle_list_frameworks,
};
use store::ContractStore;

/// Command-line arguments for the ESG server
#[derive(Parser, Debug)]
#[command(name = "esg-server")]
#[command(about = "ESG contract scoring server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Analysis timeout in milliseconds
    #[arg(long, default_value = "10000")]
    timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Largest accepted document, in decoded bytes
    #[arg(long, default_value = "20000000")]
    max_upload_bytes: usize,

    /// Analyses allowed to run at the same time
    #[arg(long, default_value = "4")]
    max_concurrent: usize,

    /// Analysis results kept in memory before the oldest are evicted
    #[arg(long, default_value = "10000")]
    max_contracts: usize,

    /// JSON keyword lexicon replacing the built-in one
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<EsgAnalyzer>,
    pub store: Arc<ContractStore>,
    pub permits: Arc<Semaphore>,
    /// Analysis timeout in milliseconds
    pub timeout_ms: u64,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        analyzer: EsgAnalyzer,
        timeout_ms: u64,
        max_concurrent: usize,
        max_upload_bytes: usize,
        max_contracts: usize,
    ) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            store: Arc::new(ContractStore::with_capacity(max_contracts)),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout_ms,
            max_upload_bytes,
        }
    }
}

/// Request body limit for a decoded upload limit.
///
/// base64 inflates uploads by 4/3, plus room for the JSON envelope.
pub fn body_limit(max_upload_bytes: usize) -> usize {
    (max_upload_bytes / 3 + 1)
        .saturating_mul(4)
        .saturating_add(64 * 1024)
}

/// Route panic reports to the log instead of raw stderr.
///
/// The extractor catches decoder panics and carries on, but the panic hook
/// still fires first.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string payload".to_string());
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        warn!(location = %location, "panic: {}", message);
    }));
}

/// API routes without the network-facing middleware
pub fn router(state: AppState) -> Router {
    let limit = body_limit(state.max_upload_bytes);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/contracts", get(handle_list_contracts))
        .route("/api/contracts/analyze", post(handle_analyze))
        .route("/api/contracts/:id", get(handle_get_contract))
        .route("/api/dashboard", get(handle_dashboard))
        .route("/api/frameworks", get(handle_list_frameworks))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    install_panic_hook();

    info!("Starting ESG server on {}:{}", args.host, args.port);

    let lexicon = match &args.lexicon {
        Some(path) => KeywordLexicon::from_path(path)
            .with_context(|| format!("Failed to load lexicon from {}", path.display()))?,
        None => DEFAULT_LEXICON.clone(),
    };
    info!("Lexicon loaded: {} terms", lexicon.term_count());

    let analyzer = EsgAnalyzer::new(Arc::new(lexicon), AnalyzerConfig::default());
    let state = AppState::new(
        analyzer,
        args.timeout_ms,
        args.max_concurrent,
        args.max_upload_bytes,
        args.max_contracts,
    );

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!(
        "Analysis timeout: {}ms, max concurrent: {}, max upload: {} bytes",
        args.timeout_ms, args.max_concurrent, args.max_upload_bytes
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
