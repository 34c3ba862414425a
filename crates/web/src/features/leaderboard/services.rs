use sqlx::PgPool;
use storage::{
    dto::{
        common::{PaginationMeta, PaginationParams},
        leaderboard::LeaderboardResponse,
    },
    error::Result,
    repository::leaderboard::LeaderboardRepository,
};
use uuid::Uuid;

/// One leaderboard page, flagging and ranking the caller when known
pub async fn get_leaderboard(
    pool: &PgPool,
    pagination: &PaginationParams,
    current_user: Option<Uuid>,
) -> Result<LeaderboardResponse> {
    let repo = LeaderboardRepository::new(pool);
    let (rows, total_items) = repo.get_page(pagination).await?;

    let current_user_rank = match current_user {
        Some(user_id) => repo.rank_of(user_id).await?,
        None => None,
    };

    Ok(LeaderboardResponse {
        entries: rows
            .into_iter()
            .map(|row| row.into_entry(current_user))
            .collect(),
        current_user_rank,
        pagination: PaginationMeta::new(pagination.page, pagination.page_size, total_items),
    })
}
