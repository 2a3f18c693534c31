// GDN Campaign Country Optimizer - Web Server
// Upload spend + revenue, inspect partitions, filter campaigns, download CSVs

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use gdn_optimizer::{
    filter_rows, run_pipeline, write_partition_csv, CampaignSelection, CountryResolver,
    ReconciledRow, ReconciliationReport, SpendLayout, EXCLUDED_FILE, PERFORMING_FILE,
};

/// One process-local session: last uploaded report + current selection.
/// Reset on restart; inputs must be resupplied on every run.
#[derive(Default)]
struct Session {
    report: Option<ReconciliationReport>,
    selection: CampaignSelection,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
    layout: SpendLayout,
    countries: CountryResolver,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Upload summary response
#[derive(Serialize)]
struct UploadResponse {
    performing: usize,
    excluded: usize,
    campaign_ids: Vec<i64>,
}

/// Filtered results response
#[derive(Serialize)]
struct ResultsResponse {
    performing: Vec<ReconciledRow>,
    excluded: Vec<ReconciledRow>,
    campaign_ids: Vec<i64>,
    selected: Vec<i64>,
}

#[derive(Deserialize)]
struct SelectionRequest {
    selected: Vec<i64>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/upload - Accept both input files, run the pipeline
///
/// Multipart fields: "spend" (xlsx) and "revenue" (csv). Both are
/// required; with either missing nothing runs and the client keeps its
/// waiting state. A successful upload resets the selection to all
/// discovered campaigns.
async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> impl IntoResponse {
    let mut spend_bytes: Option<Vec<u8>> = None;
    let mut revenue_bytes: Option<Vec<u8>> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or_default().to_string();
                let bytes = match field.bytes().await {
                    Ok(b) => b.to_vec(),
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ApiResponse::<UploadResponse>::err(format!(
                                "Failed to read uploaded field '{}': {}",
                                name, e
                            ))),
                        )
                            .into_response()
                    }
                };
                match name.as_str() {
                    "spend" => spend_bytes = Some(bytes),
                    "revenue" => revenue_bytes = Some(bytes),
                    _ => {} // unknown fields ignored
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<UploadResponse>::err(format!(
                        "Malformed multipart upload: {}",
                        e
                    ))),
                )
                    .into_response()
            }
        }
    }

    let (spend, revenue) = match (spend_bytes, revenue_bytes) {
        (Some(s), Some(r)) => (s, r),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<UploadResponse>::err(
                    "Please upload both spend and revenue files to proceed",
                )),
            )
                .into_response()
        }
    };

    match run_pipeline(&spend, &revenue, &state.layout, &state.countries) {
        Ok(report) => {
            let response = UploadResponse {
                performing: report.performing.len(),
                excluded: report.excluded.len(),
                campaign_ids: report.campaign_ids(),
            };

            let mut session = state.session.lock().unwrap();
            session.selection = CampaignSelection::all_of(report.campaign_ids());
            session.report = Some(report);

            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            eprintln!("Pipeline error: {:#}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<UploadResponse>::err(format!("{:#}", e))),
            )
                .into_response()
        }
    }
}

/// GET /api/results - Current partitions filtered by the selection
async fn get_results(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().unwrap();

    match &session.report {
        Some(report) => {
            let response = ResultsResponse {
                performing: filter_rows(&report.performing, &session.selection),
                excluded: filter_rows(&report.excluded, &session.selection),
                campaign_ids: report.campaign_ids(),
                selected: session.selection.ids(),
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        None => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<ResultsResponse>::err(
                "Please upload both spend and revenue files to proceed",
            )),
        )
            .into_response(),
    }
}

/// POST /api/selection - Replace the campaign selection
async fn set_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> impl IntoResponse {
    let mut session = state.session.lock().unwrap();
    session.selection = CampaignSelection::all_of(request.selected);
    Json(ApiResponse::ok(session.selection.ids()))
}

/// POST /api/selection/all - Select every discovered campaign
async fn select_all(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().unwrap();
    let all = session
        .report
        .as_ref()
        .map(|r| r.campaign_ids())
        .unwrap_or_default();
    session.selection = CampaignSelection::all_of(all);
    Json(ApiResponse::ok(session.selection.ids()))
}

/// POST /api/selection/none - Deselect everything
async fn select_none(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().unwrap();
    session.selection = CampaignSelection::none();
    Json(ApiResponse::ok(session.selection.ids()))
}

/// GET /api/export/:partition - Download a partition as CSV
async fn export_partition(
    State(state): State<AppState>,
    Path(partition): Path<String>,
) -> impl IntoResponse {
    let session = state.session.lock().unwrap();

    let report = match &session.report {
        Some(r) => r,
        None => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<String>::err(
                    "Please upload both spend and revenue files to proceed",
                )),
            )
                .into_response()
        }
    };

    let (rows, filename) = match partition.as_str() {
        "performing" => (&report.performing, PERFORMING_FILE),
        "excluded" => (&report.excluded, EXCLUDED_FILE),
        other => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<String>::err(format!(
                    "Unknown partition '{}' (expected 'performing' or 'excluded')",
                    other
                ))),
            )
                .into_response()
        }
    };

    let filtered = filter_rows(rows, &session.selection);
    match write_partition_csv(&filtered) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            eprintln!("Export error: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<String>::err(format!("{:#}", e))),
            )
                .into_response()
        }
    }
}

/// GET / - Serve the embedded single-page UI
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 GDN Campaign Country Optimizer - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let state = AppState {
        session: Arc::new(Mutex::new(Session::default())),
        layout: SpendLayout::default(),
        countries: CountryResolver::builtin(),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload))
        .route("/results", get(get_results))
        .route("/selection", post(set_selection))
        .route("/selection/all", post(select_all))
        .route("/selection/none", post(select_none))
        .route("/export/:partition", get(export_partition))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/results");
    println!("   UI:  http://localhost:3000");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
