use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::PaginationMeta;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub username: String,
    pub points: i64,
    pub rank: i64,
    pub is_current_user: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
    /// `None` when the caller is anonymous or unknown.
    pub current_user_rank: Option<i64>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, FromRow)]
pub struct RankedUserRow {
    pub user_id: Uuid,
    pub username: String,
    pub total_points: i64,
    pub rank: i64,
}

impl RankedUserRow {
    pub fn into_entry(self, current_user: Option<Uuid>) -> LeaderboardEntry {
        LeaderboardEntry {
            id: self.user_id,
            username: self.username,
            points: self.total_points,
            rank: self.rank,
            is_current_user: current_user == Some(self.user_id),
        }
    }
}
