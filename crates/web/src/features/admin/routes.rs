use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{create_user, generate_qr_strings, reconcile};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(admin_api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/generate-qr-strings", post(generate_qr_strings))
        .route("/users", post(create_user))
        .route("/reconcile", get(reconcile))
        .route_layer(middleware::from_fn_with_state(admin_api_keys, require_auth))
}
