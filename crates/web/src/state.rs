use axum::extract::FromRef;
use storage::Database;

use crate::middleware::auth::ApiKeys;

#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub max_attempts: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub scan_settings: ScanSettings,
    pub api_keys: ApiKeys,
    pub admin_api_keys: ApiKeys,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for ScanSettings {
    fn from_ref(state: &AppState) -> Self {
        state.scan_settings
    }
}
