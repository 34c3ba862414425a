use sqlx::PgPool;

use crate::dto::reconciliation::ReconciliationReport;
use crate::error::Result;
use crate::repository::user::UserRepository;

/// Compare every user's running total with the sum of their scans.
pub async fn reconcile_user_totals(pool: &PgPool) -> Result<ReconciliationReport> {
    let repo = UserRepository::new(pool);
    let users_checked = repo.count().await?;
    let mismatches = repo.find_balance_mismatches().await?;

    for mismatch in &mismatches {
        tracing::warn!(
            user_id = %mismatch.user_id,
            total_points = mismatch.total_points,
            scanned_points = mismatch.scanned_points,
            drift = mismatch.drift(),
            "User total does not match scan history"
        );
    }

    Ok(ReconciliationReport {
        users_checked,
        mismatches,
    })
}
