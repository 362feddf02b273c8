use crate::{
    analysis::Analyzer,
    config::{Config, MAX_FONT_FILE_BYTES},
    errors::AppError,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;

const FONT_FILE_FIELD: &str = "fontFile";
// room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct SharedState {
    analyzer: Arc<Analyzer>,
}

impl SharedState {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self { analyzer }
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/search-font", post(search_font))
        .route(
            "/api/analyze-file",
            post(analyze_file)
                .layer(DefaultBodyLimit::max(MAX_FONT_FILE_BYTES + MULTIPART_OVERHEAD)),
        )
        .layer(CorsLayer::permissive())
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(Arc::new(state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

async fn start_app(state: SharedState, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(config: &Config) -> anyhow::Result<()> {
    let analyzer = Arc::new(Analyzer::from_config(config)?);
    let state = SharedState::new(analyzer);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { start_app(state, config.port).await })
}

#[derive(Debug)]
pub struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        if self.0.is_validation() {
            log::warn!("rejected request: {}", self.0);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": self.0.to_string(),
                    "details": self.0.to_string(),
                })),
            )
                .into_response()
        } else {
            log::error!("{self:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Analysis failed",
                    "details": self.0.to_string(),
                })),
            )
                .into_response()
        }
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFontRequest {
    pub font_name: Option<String>,
}

async fn index(State(state): State<Arc<SharedState>>) -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "renderer": state.analyzer.renderer_name(),
        "features": {
            "searchApi": state.analyzer.search_enabled(),
            "fontFileUpload": true,
        },
        "endpoints": [
            "GET /health",
            "POST /api/analyze",
            "POST /api/analyze-file",
            "POST /api/search-font",
        ],
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}

async fn analyze(
    State(state): State<Arc<SharedState>>,
    payload: Option<Json<AnalyzeRequest>>,
) -> Result<impl IntoResponse, HttpError> {
    let url = payload
        .and_then(|Json(p)| p.url)
        .filter(|url| !url.trim().is_empty())
        .ok_or(AppError::MissingField("url"))?;

    log::debug!("analyze: {url}");
    let analyzer = state.analyzer.clone();

    tokio::task::block_in_place(move || {
        analyzer
            .analyze_url(&url)
            .map(ApiResponse::ok)
            .map_err(Into::into)
    })
}

async fn search_font(
    State(state): State<Arc<SharedState>>,
    payload: Option<Json<SearchFontRequest>>,
) -> Result<impl IntoResponse, HttpError> {
    let font_name = payload
        .and_then(|Json(p)| p.font_name)
        .filter(|name| !name.trim().is_empty())
        .ok_or(AppError::MissingField("fontName"))?;

    let analyzer = state.analyzer.clone();

    tokio::task::block_in_place(move || {
        analyzer
            .search_font(&font_name)
            .map(ApiResponse::ok)
            .map_err(Into::into)
    })
}

async fn analyze_file(
    State(state): State<Arc<SharedState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Upload(err.body_text()))?
    {
        if field.name() != Some(FONT_FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("font").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::Upload(err.body_text()))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or(AppError::MissingField(FONT_FILE_FIELD))?;
    if bytes.len() > MAX_FONT_FILE_BYTES {
        return Err(AppError::Upload(format!(
            "{file_name} is larger than {} MB",
            MAX_FONT_FILE_BYTES / 1024 / 1024
        ))
        .into());
    }

    log::debug!("analyze-file: {file_name} ({} bytes)", bytes.len());
    let analyzer = state.analyzer.clone();

    tokio::task::block_in_place(move || {
        analyzer
            .analyze_font_file(&bytes, &file_name)
            .map(ApiResponse::ok)
            .map_err(Into::into)
    })
}
