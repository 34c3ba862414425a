use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        qr_code::{GenerateQrCodesRequest, GenerateQrCodesResponse},
        reconciliation::ReconciliationReport,
        user::{CreateUserRequest, UserResponse},
    },
};
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/admin/generate-qr-strings",
    request_body = GenerateQrCodesRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "QR codes created", body = GenerateQrCodesResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin"
)]
pub async fn generate_qr_strings(
    State(db): State<Database>,
    payload: Result<Json<GenerateQrCodesRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let response = services::generate_qr_codes(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already registered")
    ),
    tag = "admin"
)]
pub async fn create_user(
    State(db): State<Database>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let user = services::create_user(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/reconcile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Users whose totals disagree with their scans", body = ReconciliationReport),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin"
)]
pub async fn reconcile(State(db): State<Database>) -> Result<Response, WebError> {
    let report = services::reconcile(db.pool()).await?;

    Ok(Json(report).into_response())
}
