use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::scan::{ScanRequest, ScanResponse},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::CallerIdentity;
use crate::state::ScanSettings;

use super::services;

#[utoipa::path(
    post,
    path = "/api/scan",
    request_body = ScanRequest,
    params(
        ("x-user-id" = Uuid, Header, description = "Authenticated caller")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Scan recorded and points credited", body = ScanResponse),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Missing API key or caller identity"),
        (status = 404, description = "QR code not registered"),
        (status = 409, description = "QR code scanned by this user within the last 24 hours"),
        (status = 410, description = "QR code has no points left"),
        (status = 500, description = "Scan could not be committed")
    ),
    tag = "scan"
)]
pub async fn submit_scan(
    State(db): State<Database>,
    State(settings): State<ScanSettings>,
    caller: CallerIdentity,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let response = services::submit_scan(
        db.pool(),
        caller.user_id,
        &payload.qr_code,
        settings.max_attempts,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)).into_response())
}
