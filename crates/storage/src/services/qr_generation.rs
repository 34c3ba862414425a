use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::qr_code::GenerateQrCodesRequest;
use crate::error::Result;
use crate::models::QrCode;
use crate::repository::qr_code::QrCodeRepository;

const RANDOM_SUFFIX_LEN: usize = 10;

/// `{prefix}QR_{unix_millis}_{random}`
pub fn new_code(prefix: &str, unix_millis: i64) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}QR_{}_{}",
        prefix,
        unix_millis,
        &random[..RANDOM_SUFFIX_LEN]
    )
}

pub fn new_codes(prefix: &str, count: u32) -> Vec<String> {
    let unix_millis = Utc::now().timestamp_millis();
    (0..count).map(|_| new_code(prefix, unix_millis)).collect()
}

/// Create `request.count` fresh codes worth `request.initial_points` each.
///
/// The request is expected to be validated by the caller.
pub async fn generate_qr_codes(pool: &PgPool, request: &GenerateQrCodesRequest) -> Result<Vec<QrCode>> {
    let codes = new_codes(&request.prefix, request.count);
    let created = QrCodeRepository::new(pool)
        .create_batch(&codes, request.initial_points)
        .await?;

    tracing::info!(
        count = created.len(),
        prefix = %request.prefix,
        initial_points = request.initial_points,
        "Generated QR codes"
    );

    Ok(created)
}
