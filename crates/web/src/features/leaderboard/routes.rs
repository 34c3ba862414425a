use axum::{Router, middleware, routing::get};

use super::handlers::get_leaderboard;
use crate::middleware::auth::{ApiKeys, require_auth_if_identified};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route_layer(middleware::from_fn_with_state(
            api_keys,
            require_auth_if_identified,
        ))
}
