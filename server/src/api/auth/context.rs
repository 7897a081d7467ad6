//! Authenticated identity attached to request extensions

use crate::core::constants::ADMIN_ROLE_ID;
use crate::data::UserRow;

/// The user a request was authenticated as
///
/// Inserted by `require_auth`; read by the `CurrentUser` and `AdminUser`
/// extractors, the admin gate and the audit layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
    pub role_name: Option<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role_id == Some(ADMIN_ROLE_ID)
    }
}

impl From<&UserRow> for Identity {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username.clone(),
            display_name: row.display_name.clone(),
            role_id: row.role_id,
            role_name: row.role_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role_id: Option<i64>) -> Identity {
        Identity {
            id: 7,
            username: "labuser1".into(),
            display_name: None,
            role_id,
            role_name: None,
        }
    }

    #[test]
    fn test_only_role_one_is_admin() {
        assert!(identity(Some(1)).is_admin());
        assert!(!identity(Some(2)).is_admin());
        assert!(!identity(None).is_admin());
    }

    #[test]
    fn test_from_user_row_drops_secrets() {
        let row = UserRow {
            id: 3,
            username: "tech".into(),
            password_hash: "hash".into(),
            display_name: Some("Tech".into()),
            role_id: Some(2),
            role_name: Some("lab technician".into()),
            access_token: Some("tok".into()),
            token_expires_at: Some(100),
        };
        let id = Identity::from(&row);
        assert_eq!(id.id, 3);
        assert_eq!(id.role_name.as_deref(), Some("lab technician"));
        assert!(!format!("{:?}", id).contains("tok"));
    }
}
