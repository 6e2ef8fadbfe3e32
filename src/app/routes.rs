use crate::app::response::{ConvertResponse, HealthResponse};
use crate::core::converter::ConversionService;
use crate::utils::error::{ConverterError, Result};
use crate::utils::validation::validate_upload_filename;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 上傳的 multipart 欄位名稱
const FILE_FIELD: &str = "file";

/// Room for multipart boundaries and part headers on top of the text limit.
const MULTIPART_OVERHEAD_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConversionService>,
}

impl AppState {
    pub fn new(service: ConversionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConvertTextRequest {
    pub text: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state
        .service
        .max_input_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(health))
        .route("/convert", post(convert_file))
        .route("/convert-text", post(convert_text))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn convert_file(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>> {
    let limit = state.service.max_input_bytes();
    let mut multipart = multipart
        .map_err(|e| rejection_error(e.status(), "Invalid upload", e.body_text(), limit))?;

    let (filename, bytes) = read_file_field(&mut multipart, limit).await?;
    validate_upload_filename(&filename)?;

    let text = String::from_utf8(bytes)
        .map_err(|_| ConverterError::validation("File must be UTF-8 encoded text"))?;

    tracing::info!("Converting uploaded file {} ({} bytes)", filename, text.len());
    let record = state.service.convert(&text, "File is empty").await?;

    Ok(Json(ConvertResponse::for_file(filename, record)))
}

async fn read_file_field(multipart: &mut Multipart, limit: usize) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejection_error(e.status(), "Invalid upload", e.body_text(), limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| rejection_error(e.status(), "Invalid upload", e.body_text(), limit))?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(ConverterError::validation(
        "Missing 'file' field in form data",
    ))
}

async fn convert_text(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ConvertTextRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>> {
    let Json(request) = payload.map_err(|e| {
        rejection_error(
            e.status(),
            "Invalid JSON body",
            e.body_text(),
            state.service.max_input_bytes(),
        )
    })?;

    let text = request
        .text
        .ok_or_else(|| ConverterError::validation("Missing 'text' field in request body"))?;

    tracing::info!("Converting inline text ({} bytes)", text.len());
    let record = state.service.convert(&text, "Text cannot be empty").await?;

    Ok(Json(ConvertResponse::for_text(record)))
}

/// 本體超過 `DefaultBodyLimit` 時 axum 回報 413，其餘拒絕都算輸入錯誤
fn rejection_error(
    status: StatusCode,
    context: &str,
    detail: String,
    limit: usize,
) -> ConverterError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ConverterError::BodyTooLarge { limit }
    } else {
        ConverterError::validation(format!("{}: {}", context, detail))
    }
}
