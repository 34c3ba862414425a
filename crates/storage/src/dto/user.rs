use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Provisioning request used by the admin surface; credentials live with the
/// authentication service, not here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(email(message = "Email must be a valid address"))]
    #[validate(length(max = 255))]
    pub email: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Username must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,
}

fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if username.trim().is_empty() {
        let mut error = validator::ValidationError::new("blank_username");
        error.message = Some("Username must not be blank".into());
        Err(error)
    } else {
        Ok(())
    }
}

impl CreateUserRequest {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn normalized_username(&self) -> String {
        self.username.trim().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub total_points: i64,
    pub created_at: DateTime<Utc>,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.user_id,
            email: user.email,
            username: user.username,
            total_points: user.total_points,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_email() {
        let req = CreateUserRequest {
            email: "  Player.One@Example.COM ".to_string(),
            username: " player1 ".to_string(),
        };
        assert_eq!(req.normalized_email(), "player.one@example.com");
        assert_eq!(req.normalized_username(), "player1");
    }

    #[test]
    fn test_rejects_blank_username() {
        let req = CreateUserRequest {
            email: "player@example.com".to_string(),
            username: "   ".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_rejects_invalid_email() {
        let req = CreateUserRequest {
            email: "not-an-email".to_string(),
            username: "player".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
