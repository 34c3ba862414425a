use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::scan::ScanHistoryEntry;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub stats: ProfileStats,
    pub recent_scans: Vec<ScanHistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_points: i64,
    pub total_scans: i64,
    /// Mean `pointsEarned` over all scans, rounded to two decimals.
    pub average_points: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointsResponse {
    pub points: i64,
}
