//! User API types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::core::constants::{CREDENTIAL_MAX_LEN, CREDENTIAL_MIN_LEN};
use crate::data::UserRow;

/// Length rule shared by usernames and passwords of new accounts
pub fn validate_credential<T: AsRef<str>>(value: T) -> Result<(), ValidationError> {
    let len = value.as_ref().chars().count() as u64;
    if len < CREDENTIAL_MIN_LEN {
        return Err(ValidationError::new("credential_min").with_message(
            format!(
                "Username and password must be at least {} characters",
                CREDENTIAL_MIN_LEN
            )
            .into(),
        ));
    }
    if len > CREDENTIAL_MAX_LEN {
        return Err(ValidationError::new("credential_max").with_message(
            format!(
                "Username and password must be at most {} characters",
                CREDENTIAL_MAX_LEN
            )
            .into(),
        ));
    }
    Ok(())
}

/// User DTO for API responses; never carries hashes or tokens
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            role_id: row.role_id,
        }
    }
}

/// Query parameters for creating a user
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreateUserQuery {
    #[serde(default)]
    #[validate(custom(function = "validate_credential"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "validate_credential"))]
    pub password: String,
    pub role_id: i64,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    pub id: i64,
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
}

/// Query parameters for deleting a user
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteUserQuery {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_length_bounds() {
        assert!(validate_credential("12345678").is_ok());
        assert!(validate_credential("x".repeat(50)).is_ok());
        assert!(validate_credential("1234567").is_err());
        assert!(validate_credential("x".repeat(51)).is_err());
        assert!(validate_credential("").is_err());
    }

    #[test]
    fn test_create_query_validation() {
        let query = CreateUserQuery {
            username: "short".into(),
            password: "long enough".into(),
            role_id: 2,
        };
        let errors = query.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(!errors.field_errors().contains_key("password"));
    }
}
