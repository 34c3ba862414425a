use sqlx::PgPool;
use storage::{
    Database,
    dto::{
        qr_code::{GenerateQrCodesRequest, GenerateQrCodesResponse},
        reconciliation::ReconciliationReport,
        user::{CreateUserRequest, UserResponse},
    },
    repository::user::UserRepository,
    services::{qr_generation, reconciliation},
};
use validator::Validate;

use crate::{AdminError, Result};

pub async fn migrate(db: &Database) -> Result<()> {
    tracing::info!("Running database migrations...");
    db.run_migrations().await?;
    tracing::info!("✓ Migrations applied");
    Ok(())
}

pub async fn generate(pool: &PgPool, request: GenerateQrCodesRequest) -> Result<GenerateQrCodesResponse> {
    request.validate()?;

    tracing::info!(
        "Generating {} QR code(s) worth {} points",
        request.count,
        request.initial_points
    );
    let created = qr_generation::generate_qr_codes(pool, &request).await?;

    Ok(GenerateQrCodesResponse::from(created))
}

pub async fn create_user(pool: &PgPool, request: CreateUserRequest) -> Result<UserResponse> {
    request.validate()?;

    let user = UserRepository::new(pool).create(&request).await?;
    tracing::info!("✓ Created user {} ({})", user.username, user.user_id);

    Ok(UserResponse::from(user))
}

pub async fn reconcile(pool: &PgPool) -> Result<ReconciliationReport> {
    let report = reconciliation::reconcile_user_totals(pool).await?;
    summarize(&report)?;
    Ok(report)
}

/// Log the report and fail when any user is out of balance.
pub fn summarize(report: &ReconciliationReport) -> Result<()> {
    tracing::info!("Checked {} user(s)", report.users_checked);

    if report.is_consistent() {
        tracing::info!("✓ All user totals match their scan history");
        return Ok(());
    }

    for mismatch in &report.mismatches {
        tracing::error!(
            "  ✗ {} ({}): stored {} vs scanned {} (drift {})",
            mismatch.username,
            mismatch.user_id,
            mismatch.total_points,
            mismatch.scanned_points,
            mismatch.drift()
        );
    }

    Err(AdminError::Inconsistent(report.mismatches.len()))
}
