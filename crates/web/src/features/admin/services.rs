use sqlx::PgPool;
use storage::{
    dto::{
        qr_code::{GenerateQrCodesRequest, GenerateQrCodesResponse},
        reconciliation::ReconciliationReport,
        user::{CreateUserRequest, UserResponse},
    },
    error::Result,
    repository::user::UserRepository,
    services::{qr_generation, reconciliation},
};

/// Create a batch of QR codes
pub async fn generate_qr_codes(
    pool: &PgPool,
    request: &GenerateQrCodesRequest,
) -> Result<GenerateQrCodesResponse> {
    let created = qr_generation::generate_qr_codes(pool, request).await?;
    Ok(GenerateQrCodesResponse::from(created))
}

/// Provision a user account
pub async fn create_user(pool: &PgPool, request: &CreateUserRequest) -> Result<UserResponse> {
    let user = UserRepository::new(pool).create(request).await?;
    tracing::info!(user_id = %user.user_id, "Created user");
    Ok(UserResponse::from(user))
}

/// Check user totals against scan history
pub async fn reconcile(pool: &PgPool) -> Result<ReconciliationReport> {
    reconciliation::reconcile_user_totals(pool).await
}
