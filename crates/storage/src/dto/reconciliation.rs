use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A user whose stored total disagrees with the sum of their scans.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceMismatch {
    pub user_id: Uuid,
    pub username: String,
    pub total_points: i64,
    pub scanned_points: i64,
}

impl BalanceMismatch {
    pub fn drift(&self) -> i64 {
        self.total_points - self.scanned_points
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub users_checked: i64,
    pub mismatches: Vec<BalanceMismatch>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}
