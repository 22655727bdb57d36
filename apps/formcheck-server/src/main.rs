//! Formcheck Server
//!
//! Accepts filled-in PDF forms and reports which required fields, option
//! groups and signatures are still missing. Provides REST API endpoints for:
//!
//! - Form completeness checks (FAIS letter, risk profile questionnaire)
//! - Plain uploads
//! - Form type listing
//!
//! ## Architecture
//!
//! Handlers spool each upload to a temporary file in the upload directory
//! and hand it to the form-compliance inspector on the blocking pool. The
//! temporary file is removed as soon as the check returns.
//!
//! - Rate limiting via tower-governor
//! - Optional ink detection on scanned signature pages

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
use form_compliance::signature::{EmbeddedImageRasterizer, InkBlobHeuristic};
use form_compliance::FormInspector;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{handle_health, handle_list_form_types, handle_upload, handle_upload_risk_profile};

/// Command-line arguments for the formcheck server
#[derive(Parser, Debug)]
#[command(name = "formcheck-server")]
#[command(about = "PDF form completeness checker")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "FORMCHECK_PORT", default_value = "12345")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "FORMCHECK_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory for uploaded files, created if absent
    #[arg(long, env = "FORMCHECK_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Maximum upload size in bytes
    #[arg(long, env = "FORMCHECK_MAX_UPLOAD_BYTES", default_value = "16777216")]
    max_upload_bytes: usize,

    /// Rate limit: requests per second per IP (0 disables)
    #[arg(long, env = "FORMCHECK_RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Look for ink on scanned pages when a signature field is empty
    #[arg(long, env = "FORMCHECK_INK_HEURISTIC")]
    ink_heuristic: bool,

    /// Luma below which a scanned pixel counts as ink
    #[arg(long, env = "FORMCHECK_INK_THRESHOLD", default_value = "128")]
    ink_threshold: u8,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inspector: Arc<FormInspector>,
    /// Where uploads are spooled and stored
    pub upload_dir: PathBuf,
}

/// Routes without rate limiting; the governor needs peer addresses, which
/// only the real listener provides
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/v1/uploadRiskProfile", post(handle_upload_risk_profile))
        .route("/api/v1/upload", post(handle_upload))
        .route("/api/v1/form-types", get(handle_list_form_types))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Bucket size for the per-IP limiter: two seconds' worth of requests
pub fn burst_size(rate_limit: u32) -> u32 {
    rate_limit.saturating_mul(2)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting formcheck server on {}:{}", args.host, args.port);

    std::fs::create_dir_all(&args.upload_dir).with_context(|| {
        format!(
            "Failed to create upload directory {}",
            args.upload_dir.display()
        )
    })?;

    let mut inspector = FormInspector::new();
    if args.ink_heuristic {
        inspector = inspector.with_signature_heuristic(Arc::new(
            InkBlobHeuristic::new(EmbeddedImageRasterizer::new()).with_threshold(args.ink_threshold),
        ));
    }

    // Create shared state
    let state = AppState {
        inspector: Arc::new(inspector),
        upload_dir: args.upload_dir.clone(),
    };

    let mut app = build_router(state, args.max_upload_bytes);

    if args.rate_limit > 0 {
        // Create rate limiter configuration
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(args.rate_limit.into())
                .burst_size(burst_size(args.rate_limit))
                .finish()
                .context("Failed to create rate limiter config")?,
        );
        app = app.layer(GovernorLayer {
            config: governor_conf,
        });
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Upload directory: {}", args.upload_dir.display());
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!(
        "Ink heuristic: {}",
        if args.ink_heuristic { "enabled" } else { "disabled" }
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
