use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::scan::ScanHistoryEntry;
use crate::error::Result;
use crate::models::Scan;

const SCAN_COLUMNS: &str = "scan_id, qr_code_id, user_id, points_earned, scanned_at";

/// Aggregates over one user's scan history.
#[derive(Debug, Clone, FromRow)]
pub struct ScanStats {
    pub total_scans: i64,
    pub total_points: i64,
    pub average_points: Decimal,
}

pub struct ScanRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScanRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Most recent scan of `qr_code_id` by `user_id` at or after `window_start`
    pub async fn find_recent(
        &self,
        user_id: Uuid,
        qr_code_id: Uuid,
        window_start: DateTime<Utc>,
    ) -> Result<Option<Scan>> {
        let scan = sqlx::query_as::<_, Scan>(&format!(
            r#"
            SELECT {SCAN_COLUMNS}
            FROM scans
            WHERE user_id = $1
              AND qr_code_id = $2
              AND scanned_at >= $3
            ORDER BY scanned_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(qr_code_id)
        .bind(window_start)
        .fetch_optional(self.pool)
        .await?;

        Ok(scan)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        qr_code_id: Uuid,
        user_id: Uuid,
        points_earned: i32,
        scanned_at: DateTime<Utc>,
    ) -> Result<Scan> {
        let scan = sqlx::query_as::<_, Scan>(&format!(
            r#"
            INSERT INTO scans (qr_code_id, user_id, points_earned, scanned_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {SCAN_COLUMNS}
            "#
        ))
        .bind(qr_code_id)
        .bind(user_id)
        .bind(points_earned)
        .bind(scanned_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(scan)
    }

    /// Latest scans for a user, newest first, with the scanned code string
    pub async fn list_recent_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ScanHistoryEntry>> {
        let scans = sqlx::query_as::<_, ScanHistoryEntry>(
            r#"
            SELECT s.scan_id,
                   q.code AS qr_code,
                   s.points_earned,
                   s.scanned_at AS timestamp
            FROM scans s
            JOIN qr_codes q ON q.qr_code_id = s.qr_code_id
            WHERE s.user_id = $1
            ORDER BY s.scanned_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(scans)
    }

    pub async fn stats_for_user(&self, user_id: Uuid) -> Result<ScanStats> {
        let stats = sqlx::query_as::<_, ScanStats>(
            r#"
            SELECT COUNT(*)::BIGINT AS total_scans,
                   COALESCE(SUM(points_earned), 0)::BIGINT AS total_points,
                   COALESCE(ROUND(AVG(points_earned), 2), 0)::NUMERIC AS average_points
            FROM scans
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
