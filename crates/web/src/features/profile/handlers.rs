use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::profile::{PointsResponse, ProfileResponse},
};
use uuid::Uuid;

use crate::error::WebError;
use crate::middleware::auth::CallerIdentity;

use super::services;

#[utoipa::path(
    get,
    path = "/api/profile",
    params(
        ("x-user-id" = Uuid, Header, description = "Authenticated caller")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Profile with stats and recent scans", body = ProfileResponse),
        (status = 401, description = "Missing API key or caller identity"),
        (status = 404, description = "User not found")
    ),
    tag = "profile"
)]
pub async fn get_profile(
    State(db): State<Database>,
    caller: CallerIdentity,
) -> Result<Response, WebError> {
    let profile = services::get_profile(db.pool(), caller.user_id).await?;

    Ok(Json(profile).into_response())
}

#[utoipa::path(
    get,
    path = "/api/profile/points",
    params(
        ("x-user-id" = Uuid, Header, description = "Authenticated caller")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current point total", body = PointsResponse),
        (status = 401, description = "Missing API key or caller identity"),
        (status = 404, description = "User not found")
    ),
    tag = "profile"
)]
pub async fn get_points(
    State(db): State<Database>,
    caller: CallerIdentity,
) -> Result<Response, WebError> {
    let points = services::get_points(db.pool(), caller.user_id).await?;

    Ok(Json(points).into_response())
}
