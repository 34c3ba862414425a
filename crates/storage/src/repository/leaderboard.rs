use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::PaginationParams;
use crate::dto::leaderboard::RankedUserRow;
use crate::error::Result;

const RANKED_USERS: &str = r#"
    WITH ranked_users AS (
        SELECT user_id,
               username,
               total_points,
               ROW_NUMBER() OVER (ORDER BY total_points DESC, created_at ASC, user_id ASC) AS rank
        FROM users
    )
"#;

pub struct LeaderboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeaderboardRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of users ordered by total points, plus the total user count
    pub async fn get_page(&self, pagination: &PaginationParams) -> Result<(Vec<RankedUserRow>, i64)> {
        let total_items = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        let rows = sqlx::query_as::<_, RankedUserRow>(&format!(
            r#"
            {RANKED_USERS}
            SELECT user_id, username, total_points, rank
            FROM ranked_users
            ORDER BY rank
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(i64::from(pagination.limit()))
        .bind(i64::from(pagination.offset()))
        .fetch_all(self.pool)
        .await?;

        Ok((rows, total_items))
    }

    pub async fn rank_of(&self, user_id: Uuid) -> Result<Option<i64>> {
        let rank = sqlx::query_scalar::<_, i64>(&format!(
            r#"
            {RANKED_USERS}
            SELECT rank FROM ranked_users WHERE user_id = $1
            "#
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(rank)
    }
}
