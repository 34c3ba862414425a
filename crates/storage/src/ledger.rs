use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{QrCode, Scan};
use crate::repository::{qr_code::QrCodeRepository, scan::ScanRepository, user::UserRepository};

/// Scan row to append.
#[derive(Debug, Clone)]
pub struct NewScan {
    pub qr_code_id: Uuid,
    pub user_id: Uuid,
    pub points_earned: i32,
    pub scanned_at: DateTime<Utc>,
}

/// Balance change for a code, conditional on the balance the caller read.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeBalanceUpdate {
    pub qr_code_id: Uuid,
    pub expected_curr_points: i32,
    pub new_curr_points: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct UserPointsCredit {
    pub user_id: Uuid,
    pub points: i64,
}

/// Outcome of a committed scan transaction.
#[derive(Debug, Clone)]
pub struct CommittedScan {
    pub scan: Scan,
    pub remaining_points: i32,
    pub user_total_points: i64,
}

/// Durable store for codes, users and scans.
///
/// Implementations must apply the three mutations of
/// [`Ledger::commit_scan_transaction`] atomically and must refuse the commit
/// with [`StorageError::TransactionFailed`] when the code's balance is no
/// longer `expected_curr_points`.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn find_qr_code_by_code(&self, code: &str) -> Result<QrCode>;

    async fn find_recent_scan(
        &self,
        user_id: Uuid,
        qr_code_id: Uuid,
        window_start: DateTime<Utc>,
    ) -> Result<Option<Scan>>;

    async fn commit_scan_transaction(
        &self,
        scan: NewScan,
        qr_code_update: QrCodeBalanceUpdate,
        user_credit: UserPointsCredit,
    ) -> Result<CommittedScan>;
}

/// Postgres-backed ledger.
pub struct PgLedger<'a> {
    pool: &'a PgPool,
}

impl<'a> PgLedger<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Ledger for PgLedger<'_> {
    async fn find_qr_code_by_code(&self, code: &str) -> Result<QrCode> {
        QrCodeRepository::new(self.pool).find_by_code(code).await
    }

    async fn find_recent_scan(
        &self,
        user_id: Uuid,
        qr_code_id: Uuid,
        window_start: DateTime<Utc>,
    ) -> Result<Option<Scan>> {
        ScanRepository::new(self.pool)
            .find_recent(user_id, qr_code_id, window_start)
            .await
    }

    async fn commit_scan_transaction(
        &self,
        scan: NewScan,
        qr_code_update: QrCodeBalanceUpdate,
        user_credit: UserPointsCredit,
    ) -> Result<CommittedScan> {
        let result: Result<CommittedScan> = async {
            // Dropping `tx` without commit rolls back every statement below.
            let mut tx = self.pool.begin().await?;

            let swapped = QrCodeRepository::swap_curr_points(
                &mut tx,
                qr_code_update.qr_code_id,
                qr_code_update.expected_curr_points,
                qr_code_update.new_curr_points,
            )
            .await?;
            if !swapped {
                return Err(StorageError::TransactionFailed(format!(
                    "balance of QR code {} changed since it was read",
                    qr_code_update.qr_code_id
                )));
            }

            let user_total_points =
                UserRepository::credit_points(&mut tx, user_credit.user_id, user_credit.points)
                    .await?
                    .ok_or(StorageError::NotFound)?;

            let committed = ScanRepository::insert(
                &mut tx,
                scan.qr_code_id,
                scan.user_id,
                scan.points_earned,
                scan.scanned_at,
            )
            .await?;

            tx.commit().await?;

            Ok(CommittedScan {
                scan: committed,
                remaining_points: qr_code_update.new_curr_points,
                user_total_points,
            })
        }
        .await;

        result.map_err(|e| e.classify("scan conflicts with an existing record"))
    }
}
