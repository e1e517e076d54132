//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};

/// Signup request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Login email.
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, max = 128, message = "Must be 1-128 characters"))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create folder request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(
        custom(function = not_empty_trimmed),
        custom(function = no_control_chars),
        length(max = 100, message = "Must be at most 100 characters")
    )]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MAX_PASSWORD_LENGTH;
    use crate::file::MAX_FOLDER_NAME_LENGTH;

    #[test]
    fn test_signup_request_validation() {
        let ok = SignupRequest {
            email: "a@x.com".to_string(),
            password: "pw123".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = SignupRequest {
            email: "not-an-email".to_string(),
            password: "pw123".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let empty_password = SignupRequest {
            email: "a@x.com".to_string(),
            password: String::new(),
        };
        assert!(empty_password.validate().is_err());

        // Multi-byte characters count once each
        let wide = SignupRequest {
            email: "a@x.com".to_string(),
            password: "é".repeat(MAX_PASSWORD_LENGTH),
        };
        assert!(wide.validate().is_ok());

        let too_long = SignupRequest {
            email: "a@x.com".to_string(),
            password: "é".repeat(MAX_PASSWORD_LENGTH + 1),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "whatever".to_string(),
            password: "x".to_string(),
        };
        assert!(ok.validate().is_ok());

        let missing = LoginRequest {
            email: String::new(),
            password: String::new(),
        };
        let errors = missing.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_create_folder_request_validation() {
        let ok = CreateFolderRequest {
            name: "Tax returns".to_string(),
        };
        assert!(ok.validate().is_ok());

        let blank = CreateFolderRequest {
            name: "   ".to_string(),
        };
        assert!(blank.validate().is_err());

        let long = CreateFolderRequest {
            name: "x".repeat(MAX_FOLDER_NAME_LENGTH + 1),
        };
        assert!(long.validate().is_err());
    }
}
