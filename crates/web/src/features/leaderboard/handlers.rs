use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{common::PaginationParams, leaderboard::LeaderboardResponse},
};

use crate::error::WebError;
use crate::middleware::auth::CallerIdentity;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(PaginationParams),
    responses(
        (status = 200, description = "Users ranked by total points", body = LeaderboardResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Caller identity sent without a valid API key")
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(
    State(db): State<Database>,
    caller: Option<CallerIdentity>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(pagination) = pagination?;
    pagination.validate().map_err(WebError::BadRequest)?;

    let response = services::get_leaderboard(
        db.pool(),
        &pagination,
        caller.map(|caller| caller.user_id),
    )
    .await?;

    Ok(Json(response).into_response())
}
