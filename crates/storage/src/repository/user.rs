use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::reconciliation::BalanceMismatch;
use crate::dto::user::CreateUserRequest;
use crate::error::{Result, StorageError};
use crate::models::User;

const USER_COLUMNS: &str = "user_id, email, username, total_points, created_at";

pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(user)
    }

    /// Create a new user
    pub async fn create(&self, req: &CreateUserRequest) -> Result<User> {
        let email = req.normalized_email();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username)
            VALUES ($1, $2)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&email)
        .bind(req.normalized_username())
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).classify(&format!("email '{}' already exists", email)))?;

        Ok(user)
    }

    /// Add `points` to the running total inside an open transaction.
    ///
    /// Returns the new total, or `None` when the user does not exist.
    pub async fn credit_points(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        points: i64,
    ) -> Result<Option<i64>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET total_points = total_points + $2
            WHERE user_id = $1
            RETURNING total_points
            "#,
        )
        .bind(user_id)
        .bind(points)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(total)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Users whose stored total differs from the sum of their scans
    pub async fn find_balance_mismatches(&self) -> Result<Vec<BalanceMismatch>> {
        let mismatches = sqlx::query_as::<_, BalanceMismatch>(
            r#"
            SELECT u.user_id,
                   u.username,
                   u.total_points,
                   COALESCE(SUM(s.points_earned), 0)::BIGINT AS scanned_points
            FROM users u
            LEFT JOIN scans s ON s.user_id = u.user_id
            GROUP BY u.user_id, u.username, u.total_points
            HAVING u.total_points <> COALESCE(SUM(s.points_earned), 0)
            ORDER BY u.username
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(mismatches)
    }
}
