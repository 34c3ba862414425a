use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::QrCode;

const QR_CODE_COLUMNS: &str =
    "qr_code_id, code, initial_points, curr_points, created_at, updated_at";

pub struct QrCodeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> QrCodeRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a QR code by its scanned string
    pub async fn find_by_code(&self, code: &str) -> Result<QrCode> {
        let qr_code = sqlx::query_as::<_, QrCode>(&format!(
            "SELECT {QR_CODE_COLUMNS} FROM qr_codes WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(qr_code)
    }

    /// Find a QR code by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<QrCode> {
        let qr_code = sqlx::query_as::<_, QrCode>(&format!(
            "SELECT {QR_CODE_COLUMNS} FROM qr_codes WHERE qr_code_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(qr_code)
    }

    /// Insert a batch of codes, all starting at `initial_points`.
    ///
    /// Either every code is created or none is.
    pub async fn create_batch(&self, codes: &[String], initial_points: i32) -> Result<Vec<QrCode>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(codes.len());

        for code in codes {
            let qr_code = Self::insert(&mut tx, code, initial_points)
                .await
                .map_err(|e| e.classify(&format!("QR code '{}' already exists", code)))?;
            created.push(qr_code);
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        initial_points: i32,
    ) -> Result<QrCode> {
        let qr_code = sqlx::query_as::<_, QrCode>(&format!(
            r#"
            INSERT INTO qr_codes (code, initial_points, curr_points)
            VALUES ($1, $2, $2)
            RETURNING {QR_CODE_COLUMNS}
            "#
        ))
        .bind(code)
        .bind(initial_points)
        .fetch_one(&mut **tx)
        .await?;

        Ok(qr_code)
    }

    /// Compare-and-swap the remaining balance inside an open transaction.
    ///
    /// Returns `false` when the balance no longer matches `expected_curr_points`.
    pub async fn swap_curr_points(
        tx: &mut Transaction<'_, Postgres>,
        qr_code_id: Uuid,
        expected_curr_points: i32,
        new_curr_points: i32,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE qr_codes
            SET curr_points = $3,
                updated_at = NOW()
            WHERE qr_code_id = $1
              AND curr_points = $2
            "#,
        )
        .bind(qr_code_id)
        .bind(expected_curr_points)
        .bind(new_curr_points)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
