// Healthcare EDA Dashboard - Web Server
// Browser dashboard plus a JSON API over the cached dataset

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use healthcare_eda::{
    load_data, resolve_data_path, stats, web, AppConfig, Dataset, DatasetError, Page, Report,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "healthcare-server")]
#[command(version)]
#[command(about = "Web dashboard for exploratory analysis of a healthcare dataset")]
struct Args {
    /// CSV file with patient records
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(short, long)]
    addr: Option<String>,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    dataset: Arc<Dataset>,
    report: Arc<Report>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

/// Summary response (Overview metric tiles)
#[derive(Serialize)]
struct SummaryResponse {
    source: String,
    loaded_at: String,
    total_records: usize,
    total_features: usize,
    avg_billing_amount: Option<f64>,
}

/// Value counts of a single column
#[derive(Serialize)]
struct ColumnCountsResponse {
    column: String,
    counts: Vec<stats::ValueCount>,
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<String>,
}

fn api_error(status: StatusCode, err: &DatasetError) -> Response {
    (status, Json(ApiResponse::err(err.to_string()))).into_response()
}

// ============================================================================
// Page Handlers
// ============================================================================

/// GET /?page=<label> - Render the selected dashboard page
async fn serve_page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let page = Page::from_selection(query.page.as_deref().unwrap_or_default());
    match web::render_page(&state.report, page) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!("Error rendering {} page: {:#}", page.label(), err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/summary - Overview metrics
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    let overview = &state.report.overview;
    let summary = SummaryResponse {
        source: state.report.source.clone(),
        loaded_at: state.dataset.loaded_at().to_rfc3339(),
        total_records: overview.total_records,
        total_features: overview.total_features,
        avg_billing_amount: overview.avg_billing,
    };

    Json(ApiResponse::ok(summary))
}

/// GET /api/preview - First rows of the dataset
async fn get_preview(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.overview.preview.clone()))
}

/// GET /api/charts - Series behind the five EDA charts
async fn get_charts(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.charts.clone()))
}

/// GET /api/insights - Findings and conclusion
async fn get_insights(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.insights.clone()))
}

/// GET /api/columns/:name/counts - Value counts of any column
async fn get_column_counts(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.dataset.column(&name) {
        Ok(cells) => {
            let response = ColumnCountsResponse {
                counts: stats::value_counts(cells),
                column: name,
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(err @ DatasetError::MissingColumn(_)) => {
            tracing::debug!("Unknown column requested: {}", name);
            api_error(StatusCode::NOT_FOUND, &err)
        }
        Err(err) => {
            tracing::error!("Error counting column {}: {}", name, err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, &err)
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/summary", get(get_summary))
        .route("/preview", get(get_preview))
        .route("/charts", get(get_charts))
        .route("/insights", get(get_insights))
        .route("/columns/:name/counts", get(get_column_counts))
        .with_state(state.clone());

    Router::new()
        .route("/", get(serve_page))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?.with_data_path(args.data);
    if let Some(addr) = args.addr {
        config.server_addr = addr;
    }

    let data_path = resolve_data_path(&config.data_path);
    let dataset = load_data(&data_path)
        .with_context(|| format!("Failed to load dataset from {}", data_path.display()))?;
    let report = Report::build(&dataset, &config.report_options())
        .context("Failed to compute dashboard statistics")?;

    let state = AppState {
        dataset,
        report: Arc::new(report),
    };

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server_addr))?;

    tracing::info!("Dashboard running on http://{}", config.server_addr);
    tracing::info!("API: http://{}/api/summary", config.server_addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
