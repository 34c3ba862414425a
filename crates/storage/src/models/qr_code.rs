use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A redeemable code with a decaying point balance.
///
/// `initial_points` never changes after creation. `curr_points` only ever
/// decreases, and only through a committed scan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QrCode {
    pub qr_code_id: Uuid,
    pub code: String,
    pub initial_points: i32,
    pub curr_points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
