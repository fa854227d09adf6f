// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// HTTP API
//
// JSON endpoints over the processing pipeline, provider registry, pattern
// store, settings store and ingestion service.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};

use crate::application::{status_report, IngestionService, ProcessingPipeline};
use crate::domain::ingestion::is_youtube_url;
use crate::domain::llm::GenerationOptions;
use crate::domain::pattern::{group_by_category, CustomPatternDraft, PatternError, PatternRepository};
use crate::domain::process::{ProcessRequest, ProcessResult};
use crate::domain::settings::{Settings, SettingsRepository};
use crate::infrastructure::llm::ProviderRegistry;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

// Room for the non-file form fields on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

const ALLOWED_UPLOAD_TYPES: &[&str] = &[
    "application/json",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub struct AppState {
    pub pipeline: Arc<ProcessingPipeline>,
    pub settings: Arc<dyn SettingsRepository>,
    pub ingestion: Arc<IngestionService>,
    pub start_time: Instant,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        pipeline: Arc<ProcessingPipeline>,
        settings: Arc<dyn SettingsRepository>,
        ingestion: Arc<IngestionService>,
    ) -> Self {
        Self {
            pipeline,
            settings,
            ingestion,
            start_time: Instant::now(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    fn registry(&self) -> &ProviderRegistry {
        self.pipeline.registry()
    }

    fn patterns(&self) -> &dyn PatternRepository {
        self.pipeline.patterns().as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Frontend directory served for unmatched paths, with `index.html` fallback
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            static_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

pub fn app(mut state: AppState, options: RouterOptions) -> Router {
    state.max_upload_bytes = options.max_upload_bytes;
    let state = Arc::new(state);

    let api = Router::new()
        .route("/status", get(status_handler))
        .route("/patterns", get(list_patterns_handler))
        .route("/patterns/custom", post(save_custom_pattern_handler))
        .route("/patterns/custom/{name}", delete(delete_custom_pattern_handler))
        .route("/patterns/{name}", get(get_pattern_handler))
        .route("/providers", get(list_providers_handler))
        .route("/providers/configure", post(configure_providers_handler))
        .route("/process", post(process_handler))
        .route(
            "/process-file",
            post(process_file_handler).layer(DefaultBodyLimit::max(options.max_upload_bytes + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/process-url", post(process_url_handler))
        .route("/process-youtube", post(process_youtube_handler))
        .route("/settings", get(get_settings_handler).post(save_settings_handler));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(CorsLayer::permissive());

    if let Some(dir) = options.static_dir {
        info!("Serving static files from {:?}", dir);
        let index = dir.join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
}

/// JSON error body `{error, message?, ...}` with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": error.into() }),
        }
    }

    pub fn with_message(mut self, message: impl ToString) -> Self {
        self.body["message"] = Value::String(message.to_string());
        self
    }

    /// 500 body of a processing route: `{success: false, error, message}`
    fn processing_failed(error: &str, message: impl ToString) -> Self {
        let mut err = Self::new(StatusCode::INTERNAL_SERVER_ERROR, error).with_message(message);
        err.body["success"] = Value::Bool(false);
        err
    }

    fn missing_fields(required: &[&str]) -> Self {
        let mut err = Self::new(StatusCode::BAD_REQUEST, "Missing required fields");
        err.body["required"] = json!(required);
        err
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

fn require(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    if fields.iter().any(|(_, value)| value.trim().is_empty()) {
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        return Err(ApiError::missing_fields(&names));
    }
    Ok(())
}

fn parse_options(raw: &Value) -> Result<GenerationOptions, ApiError> {
    if raw.is_null() {
        return Ok(GenerationOptions::default());
    }
    serde_json::from_value(raw.clone())
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, "Invalid options").with_message(e))
}

/// 200 with the result (plus `extra` under `key`) on success, 400 with the bare result otherwise
fn result_response(result: ProcessResult, extra: Option<(&str, Value)>) -> ApiResult {
    let success = result.is_success();
    let mut body =
        serde_json::to_value(&result).map_err(|e| ApiError::processing_failed("Processing failed", e))?;

    if !success {
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }
    if let (Some((key, value)), Some(map)) = (extra, body.as_object_mut()) {
        map.insert(key.to_string(), value);
    }
    Ok((StatusCode::OK, Json(body)).into_response())
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": now_rfc3339(),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(status_report(state.patterns(), state.registry()).await)
}

async fn list_patterns_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let patterns = state.patterns().list().await;
    Json(json!({ "patterns": group_by_category(&patterns) }))
}

async fn get_pattern_handler(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult {
    match state.patterns().get(&name).await {
        Ok(pattern) => Ok(Json(pattern).into_response()),
        Err(e) => Err(ApiError::new(StatusCode::NOT_FOUND, "Pattern not found").with_message(e)),
    }
}

async fn list_providers_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let providers = state.registry().list_providers().await;
    Json(json!({ "providers": providers }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigureProvidersRequest {
    #[serde(default)]
    api_keys: HashMap<String, Option<String>>,
}

async fn configure_providers_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigureProvidersRequest>,
) -> Json<Value> {
    let credentials: HashMap<String, String> = request
        .api_keys
        .into_iter()
        .map(|(id, key)| (id, key.unwrap_or_default()))
        .collect();

    let providers = state.registry().configure_providers(&credentials).await;
    Json(json!({ "providers": providers }))
}

async fn process_handler(State(state): State<Arc<AppState>>, Json(request): Json<ProcessRequest>) -> ApiResult {
    require(&[
        ("pattern", request.pattern.as_str()),
        ("input", request.input.as_str()),
        ("provider", request.provider.as_str()),
        ("model", request.model.as_str()),
    ])?;

    let result = state.pipeline.process(request).await;
    result_response(result, None)
}

async fn process_file_handler(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> ApiResult {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(e.status(), "File processing failed").with_message(e.body_text())
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let mime = field.content_type().unwrap_or("application/octet-stream").to_string();
            if !mime.starts_with("text/") && !ALLOWED_UPLOAD_TYPES.contains(&mime.as_str()) {
                return Err(ApiError::new(StatusCode::BAD_REQUEST, format!("Unsupported file type: {}", mime)));
            }
            let bytes = field.bytes().await.map_err(|e| {
                ApiError::new(e.status(), "File processing failed").with_message(e.body_text())
            })?;
            file = Some((original_name, mime, bytes.to_vec()));
        } else {
            let value = field.text().await.map_err(|e| {
                ApiError::new(e.status(), "File processing failed").with_message(e.body_text())
            })?;
            fields.insert(name, value);
        }
    }

    let Some((original_name, mime, bytes)) = file else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded"));
    };
    if bytes.len() > state.max_upload_bytes {
        return Err(ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "File too large")
            .with_message(format!("Uploads are limited to {} bytes", state.max_upload_bytes)));
    }

    let field = |key: &str| fields.get(key).cloned().unwrap_or_default();
    let (pattern, provider, model) = (field("pattern"), field("provider"), field("model"));
    require(&[("pattern", pattern.as_str()), ("provider", provider.as_str()), ("model", model.as_str())])?;

    let options = match fields.get("options").map(|raw| raw.trim()).filter(|raw| !raw.is_empty()) {
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, "Invalid options").with_message(e))?;
            parse_options(&value)?
        }
        None => GenerationOptions::default(),
    };

    let size = bytes.len();
    let input = String::from_utf8_lossy(&bytes).into_owned();
    info!("Processing uploaded file '{}' ({} bytes, {})", original_name, size, mime);

    let request = ProcessRequest::new(pattern, input, provider, model).with_options(options);
    let result = state.pipeline.process(request).await;
    result_response(
        result,
        Some((
            "fileInfo",
            json!({ "originalName": original_name, "size": size, "type": mime }),
        )),
    )
}

/// Body of the URL and YouTube routes
#[derive(Debug, Deserialize)]
struct SourceProcessRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    pattern: String,
    #[serde(default)]
    provider: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    options: Value,
}

impl SourceProcessRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require(&[
            ("url", self.url.as_str()),
            ("pattern", self.pattern.as_str()),
            ("provider", self.provider.as_str()),
            ("model", self.model.as_str()),
        ])
    }

    fn into_process_request(self, input: String) -> Result<ProcessRequest, ApiError> {
        let options = parse_options(&self.options)?;
        Ok(ProcessRequest::new(self.pattern, input, self.provider, self.model).with_options(options))
    }
}

async fn process_url_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SourceProcessRequest>,
) -> ApiResult {
    request.validate()?;

    let scraped = state.ingestion.scrape_url(&request.url).await.map_err(|e| {
        warn!("Scraping {} failed: {}", request.url, e);
        ApiError::processing_failed("URL processing failed", e)
    })?;

    let url_info = json!({
        "url": scraped.url,
        "title": scraped.title,
        "contentLength": scraped.length,
    });
    let process_request = request.into_process_request(scraped.content)?;
    let result = state.pipeline.process(process_request).await;
    result_response(result, Some(("urlInfo", url_info)))
}

async fn process_youtube_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SourceProcessRequest>,
) -> ApiResult {
    request.validate()?;
    if !is_youtube_url(&request.url) {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Invalid YouTube URL"));
    }

    let include_description = request.options.get("includeDescription").and_then(Value::as_bool) != Some(false);
    let video = state
        .ingestion
        .process_youtube(&request.url, include_description)
        .await
        .map_err(|e| {
            warn!("YouTube ingestion for {} failed: {}", request.url, e);
            ApiError::processing_failed("YouTube processing failed", e)
        })?;

    let youtube_info = json!({
        "url": video.url,
        "title": video.title,
        "contentLength": video.length,
        "metadata": video.metadata,
    });
    let process_request = request.into_process_request(video.content)?;
    let result = state.pipeline.process(process_request).await;
    result_response(result, Some(("youtubeInfo", youtube_info)))
}

async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(state.settings.load().await)
}

async fn save_settings_handler(State(state): State<Arc<AppState>>, Json(settings): Json<Settings>) -> ApiResult {
    match state.settings.save(settings).await {
        Ok(receipt) => Ok(Json(json!({
            "success": true,
            "saved": receipt.saved,
            "path": receipt.path,
            "timestamp": receipt.timestamp,
        }))
        .into_response()),
        Err(e) => {
            error!("Failed to save settings: {}", e);
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save settings").with_message(e))
        }
    }
}

#[derive(Debug, Deserialize)]
struct CustomPatternRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: String,
}

async fn save_custom_pattern_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CustomPatternRequest>,
) -> ApiResult {
    if request.name.trim().is_empty() || request.content.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Pattern name and content are required"));
    }

    let draft = CustomPatternDraft {
        name: request.name,
        category: request.category,
        description: request.description,
        content: request.content,
    };

    match state.patterns().save_custom(draft).await {
        Ok(metadata) => Ok(Json(json!({ "success": true, "pattern": metadata })).into_response()),
        Err(e @ (PatternError::InvalidName(_) | PatternError::EmptyContent)) => {
            Err(ApiError::new(StatusCode::BAD_REQUEST, "Failed to save custom pattern").with_message(e))
        }
        Err(e) => Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save custom pattern").with_message(e)),
    }
}

async fn delete_custom_pattern_handler(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult {
    match state.patterns().delete_custom(&name).await {
        Ok(()) => Ok(Json(json!({ "success": true })).into_response()),
        Err(e) => Err(ApiError::new(StatusCode::NOT_FOUND, "Failed to delete custom pattern").with_message(e)),
    }
}
