use axum::{Router, middleware, routing::get};

use super::handlers::{get_points, get_profile};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/points", get(get_points))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
