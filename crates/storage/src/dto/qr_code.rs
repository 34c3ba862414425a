use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const MAX_BATCH_SIZE: u32 = 50;
pub const MAX_INITIAL_POINTS: i32 = 1_000_000;

/// Admin request for a batch of fresh codes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerateQrCodesRequest {
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 50, message = "Count must be between 1 and 50"))]
    pub count: u32,

    #[serde(default)]
    #[validate(length(max = 32, message = "Prefix must be at most 32 characters"))]
    #[validate(custom(function = "validate_prefix"))]
    pub prefix: String,

    #[serde(default = "default_initial_points")]
    #[validate(range(
        min = 1,
        max = 1_000_000,
        message = "initialPoints must be between 1 and 1000000"
    ))]
    pub initial_points: i32,
}

impl Default for GenerateQrCodesRequest {
    fn default() -> Self {
        Self {
            count: default_count(),
            prefix: String::new(),
            initial_points: default_initial_points(),
        }
    }
}

fn default_count() -> u32 {
    10
}

fn default_initial_points() -> i32 {
    10
}

fn validate_prefix(prefix: &str) -> Result<(), validator::ValidationError> {
    if prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("invalid_prefix");
        error.message = Some("Prefix may only contain letters, digits, '_' and '-'".into());
        Err(error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQrCode {
    pub id: Uuid,
    pub code: String,
    pub initial_points: i32,
    pub curr_points: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrCodesResponse {
    pub qr_strings: Vec<String>,
    pub created_codes: Vec<CreatedQrCode>,
}

impl From<crate::models::QrCode> for CreatedQrCode {
    fn from(qr: crate::models::QrCode) -> Self {
        Self {
            id: qr.qr_code_id,
            code: qr.code,
            initial_points: qr.initial_points,
            curr_points: qr.curr_points,
            created_at: qr.created_at,
        }
    }
}

impl From<Vec<crate::models::QrCode>> for GenerateQrCodesResponse {
    fn from(codes: Vec<crate::models::QrCode>) -> Self {
        let qr_strings = codes.iter().map(|qr| qr.code.clone()).collect();
        let created_codes = codes.into_iter().map(CreatedQrCode::from).collect();
        Self {
            qr_strings,
            created_codes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let req: GenerateQrCodesRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.count, 10);
        assert_eq!(req.initial_points, 10);
        assert!(req.prefix.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_count_bounds() {
        let req = GenerateQrCodesRequest {
            count: MAX_BATCH_SIZE,
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let req = GenerateQrCodesRequest {
            count: MAX_BATCH_SIZE + 1,
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = GenerateQrCodesRequest {
            count: 0,
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_initial_points_bounds() {
        let req: GenerateQrCodesRequest =
            serde_json::from_str(r#"{"initialPoints": 0}"#).unwrap();
        assert!(req.validate().is_err());

        let req = GenerateQrCodesRequest {
            initial_points: MAX_INITIAL_POINTS + 1,
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_prefix_charset() {
        let req: GenerateQrCodesRequest =
            serde_json::from_str(r#"{"prefix": "PREMIUM_"}"#).unwrap();
        assert!(req.validate().is_ok());

        let req: GenerateQrCodesRequest =
            serde_json::from_str(r#"{"prefix": "bad prefix!"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
