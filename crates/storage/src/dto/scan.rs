use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /scan`. Anything besides `qrCode` is rejected.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScanRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "QR code must be between 1 and 255 characters"
    ))]
    pub qr_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub scan_id: Uuid,
    pub qr_code: String,
    pub points_earned: i32,
    pub timestamp: DateTime<Utc>,
    pub remaining_points: i32,
    pub total_points: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CooldownDetails {
    pub last_scanned: DateTime<Utc>,
    /// Seconds until the code can be redeemed again by this user.
    pub cooldown_remaining: i64,
}

/// Recent scan as listed on the profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanHistoryEntry {
    pub scan_id: Uuid,
    pub qr_code: String,
    pub points_earned: i32,
    pub timestamp: DateTime<Utc>,
}
