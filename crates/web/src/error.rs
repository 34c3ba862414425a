use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::{
    dto::scan::CooldownDetails, error::StorageError, services::scan_transaction::ScanError,
};
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Scan(ScanError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Scan(e) => write!(f, "Scan rejected: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Scan(ScanError::UnknownCode) => StatusCode::NOT_FOUND,
            Self::Scan(ScanError::Cooldown(_)) => StatusCode::CONFLICT,
            Self::Scan(ScanError::Exhausted) => StatusCode::GONE,
            Self::Scan(ScanError::UnknownUser) => StatusCode::UNAUTHORIZED,
            Self::Scan(ScanError::TransactionFailed { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Scan(ScanError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "error": "not_found",
                    "message": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg)) => {
                json!({
                    "error": "conflict",
                    "message": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "internal",
                    "message": "An internal error occurred"
                })
            }
            Self::Scan(e @ ScanError::Cooldown(status)) => {
                let details = CooldownDetails {
                    last_scanned: status.last_scanned,
                    cooldown_remaining: status.remaining.num_seconds(),
                };
                json!({
                    "error": "cooldown",
                    "message": e.to_string(),
                    "details": details
                })
            }
            Self::Scan(e @ ScanError::TransactionFailed { .. }) => {
                tracing::error!("Scan transaction failed: {}", e);
                json!({
                    "error": e.reason(),
                    "message": "Failed to process scan, please retry"
                })
            }
            Self::Scan(ScanError::Storage(e)) => {
                tracing::error!("Storage error during scan: {:?}", e);
                json!({
                    "error": "internal",
                    "message": "Failed to process scan"
                })
            }
            Self::Scan(e) => {
                json!({
                    "error": e.reason(),
                    "message": e.to_string()
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "validation_failed",
                    "message": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": "bad_request",
                    "message": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "unauthorized",
                    "message": "Authentication required"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ScanError> for WebError {
    fn from(error: ScanError) -> Self {
        Self::Scan(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use storage::services::cooldown::CooldownStatus;

    use super::*;

    #[test]
    fn test_scan_rejections_map_to_status_codes() {
        let cases = [
            (ScanError::UnknownCode, StatusCode::NOT_FOUND),
            (ScanError::Exhausted, StatusCode::GONE),
            (ScanError::UnknownUser, StatusCode::UNAUTHORIZED),
            (
                ScanError::TransactionFailed { attempts: 3 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(WebError::from(error).into_response().status(), expected);
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_cooldown_is_conflict_with_details() {
        let now = Utc::now();
        let last_scanned = now - Duration::hours(1);
        let status = CooldownStatus::from_last_scan(last_scanned, now);
        let response = WebError::from(ScanError::Cooldown(status)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "cooldown");
        assert!(body["message"].as_str().unwrap().contains("23h 0m"));
        assert_eq!(body["details"]["cooldownRemaining"], 23 * 3600);
        assert_eq!(
            body["details"]["lastScanned"],
            serde_json::to_value(last_scanned).unwrap()
        );
    }

    #[tokio::test]
    async fn test_scan_rejection_bodies_carry_reason() {
        let body = body_json(WebError::from(ScanError::UnknownCode).into_response()).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "QR code not registered in system");
        assert!(body.get("details").is_none());

        let body = body_json(WebError::from(ScanError::Exhausted).into_response()).await;
        assert_eq!(body["error"], "exhausted");
    }

    #[test]
    fn test_storage_errors() {
        assert_eq!(
            WebError::from(StorageError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::from(StorageError::ConstraintViolation("dup".to_string()))
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WebError::BadRequest("bad".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
