use sqlx::PgPool;
use storage::{
    dto::profile::{PointsResponse, ProfileResponse, ProfileStats},
    error::Result,
    repository::{scan::ScanRepository, user::UserRepository},
};
use uuid::Uuid;

pub const RECENT_SCANS_LIMIT: i64 = 10;

/// Profile with scan statistics and the latest scans
pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<ProfileResponse> {
    let user = UserRepository::new(pool).find_by_id(user_id).await?;

    let scans = ScanRepository::new(pool);
    let stats = scans.stats_for_user(user_id).await?;
    let recent_scans = scans
        .list_recent_for_user(user_id, RECENT_SCANS_LIMIT)
        .await?;

    Ok(ProfileResponse {
        id: user.user_id,
        username: user.username,
        email: user.email,
        stats: ProfileStats {
            total_points: user.total_points,
            total_scans: stats.total_scans,
            average_points: stats.average_points.round_dp(2),
        },
        recent_scans,
    })
}

/// Current point total
pub async fn get_points(pool: &PgPool, user_id: Uuid) -> Result<PointsResponse> {
    let user = UserRepository::new(pool).find_by_id(user_id).await?;

    Ok(PointsResponse {
        points: user.total_points,
    })
}
