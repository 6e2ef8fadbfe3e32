use crate::domain::model::TrainRecord;
use crate::utils::error::{ConverterError, ErrorCategory};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub description: String,
    pub endpoint: String,
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            message: "Train Data Converter API".to_string(),
            description: "Upload a text file to convert train operational data to JSON"
                .to_string(),
            endpoint: "/convert".to_string(),
            status: "ok".to_string(),
        }
    }
}

/// 成功回應；只有檔案上傳會帶 `filename`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub data: TrainRecord,
}

impl ConvertResponse {
    pub fn for_text(data: TrainRecord) -> Self {
        Self {
            success: true,
            filename: None,
            data,
        }
    }

    pub fn for_file(filename: String, data: TrainRecord) -> Self {
        Self {
            success: true,
            filename: Some(filename),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub fn status_for(error: &ConverterError) -> StatusCode {
    match error {
        ConverterError::InputTooLarge { .. } | ConverterError::BodyTooLarge { .. } => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        _ => match error.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Upstream => StatusCode::BAD_GATEWAY,
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

impl IntoResponse for ConverterError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let detail = if status.is_client_error() {
            self.to_string()
        } else {
            tracing::error!("❌ Request failed: {}", self);
            format!("Server error: {}", self)
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ConverterError::validation("File is empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ConverterError::InputTooLarge { limit: 1, actual: 2 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_for(&ConverterError::BodyTooLarge { limit: 1 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_for(&ConverterError::upstream("unauthorized", Some(401))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&ConverterError::ConfigError {
                message: "bad".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_text_envelope_omits_filename() {
        let value = serde_json::to_value(ConvertResponse::for_text(TrainRecord::unspecified()))
            .unwrap();

        assert_eq!(value["success"], true);
        assert!(value.get("filename").is_none());
        assert_eq!(value["data"]["mileage"], "Not specified");
    }

    #[test]
    fn test_file_envelope_carries_filename() {
        let value = serde_json::to_value(ConvertResponse::for_file(
            "depot.txt".to_string(),
            TrainRecord::unspecified(),
        ))
        .unwrap();

        assert_eq!(value["filename"], "depot.txt");
    }
}
