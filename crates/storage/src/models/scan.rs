use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Append-only record of one successful redemption.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Scan {
    pub scan_id: Uuid,
    pub qr_code_id: Uuid,
    pub user_id: Uuid,
    pub points_earned: i32,
    pub scanned_at: DateTime<Utc>,
}
