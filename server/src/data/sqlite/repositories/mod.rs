//! SQLite repositories
//!
//! Types (UserRow, RoleRow, etc.) should be imported from `crate::data::types`.

pub mod audit_log;
pub mod role;
pub mod user;

pub use audit_log::{insert_log, list_logs};
pub use role::{get_role, list_roles, seed_roles};
pub use user::{
    create_user, delete_user, get_by_token, get_by_username, get_user, list_users, set_session,
    update_user,
};
