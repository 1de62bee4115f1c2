use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::dto::hex_id;
use crate::model::user::User;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("Invalid regex"));

/// Unanchored `\S+@\S+\.\S+`, the same loose check the storefront applies.
pub fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("Enter a valid email".into());
        Err(err)
    }
}

fn email_shape(email: &String) -> Result<(), ValidationError> {
    validate_email_shape(email)
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "email_shape"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password atleast be 6 character long"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password atleast be 6 character long"))]
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthUserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for AuthUserResponse {
    fn from(user: &User) -> Self {
        AuthUserResponse {
            id: hex_id(&user.id),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub require_otp: bool,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub user: AuthUserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub message: String,
    pub access_token: String,
}

/// What a successful verify-otp call produced: either a fresh session or a reminder to log in.
#[derive(Debug)]
pub enum VerifyOutcome {
    AlreadyVerified,
    Verified(AuthResponse),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(validate_email_shape("ana@lume.co").is_ok());
        assert!(validate_email_shape("a.b@mail.example.org").is_ok());
        assert!(validate_email_shape("ana@lume").is_err());
        assert!(validate_email_shape("@lume.co").is_err());
        assert!(validate_email_shape("ana@.co").is_err());
        assert!(validate_email_shape("plain").is_err());
        assert!(validate_email_shape("").is_err());
    }

    #[test]
    fn test_email_shape_is_unanchored() {
        assert!(validate_email_shape("a@b.c.").is_ok());
        assert!(validate_email_shape("a@b..").is_ok());
        assert!(validate_email_shape("first last@x.y").is_ok());
        assert!(validate_email_shape("a@b.c d").is_ok());
        assert!(validate_email_shape("a @b.c").is_err());
    }

    #[test]
    fn test_register_short_password_message() {
        let req = RegisterRequest {
            username: Some("ana".into()),
            email: Some("ana@lume.co".into()),
            password: Some("123".into()),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(crate::dto::first_validation_message(&errors), "Password atleast be 6 character long");
    }
}
