use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::scan::ScanResponse,
    ledger::PgLedger,
    services::scan_transaction::{ScanCoordinator, ScanError, ScanReceipt},
};
use uuid::Uuid;

pub fn receipt_to_response(receipt: ScanReceipt) -> ScanResponse {
    ScanResponse {
        scan_id: receipt.scan.scan_id,
        qr_code: receipt.qr_code,
        points_earned: receipt.scan.points_earned,
        timestamp: receipt.scan.scanned_at,
        remaining_points: receipt.remaining_points,
        total_points: receipt.user_total_points,
        message: "Scan successfully recorded".to_string(),
    }
}

/// Redeem a code for the calling user
pub async fn submit_scan(
    pool: &PgPool,
    user_id: Uuid,
    code: &str,
    max_attempts: u32,
) -> Result<ScanResponse, ScanError> {
    let ledger = PgLedger::new(pool);
    let receipt = ScanCoordinator::with_max_attempts(&ledger, max_attempts)
        .redeem(user_id, code, Utc::now())
        .await?;

    Ok(receipt_to_response(receipt))
}
