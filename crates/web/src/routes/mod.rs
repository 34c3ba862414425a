use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::features::{admin, leaderboard, profile, scan};
use crate::state::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(scan::routes::routes(state.api_keys.clone()))
        .merge(profile::routes::routes(state.api_keys.clone()))
        .merge(leaderboard::routes::routes(state.api_keys.clone()))
        .nest("/admin", admin::routes::routes(state.admin_api_keys.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}
