//! Data storage layer
//!
//! - `sqlite` - Embedded database for users, roles and the audit log
//! - `types` - Row and filter types
//! - `traits` - Store traits consumed by the auth and audit code
//! - `error` - Data layer error type

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteService;

pub use error::DataError;

pub use traits::{AuditStore, CredentialStore};

pub use types::{
    AuditLogFilter, AuditLogRow, HttpMethodFilter, NewAuditLog, NewUser, RoleRow, UserRow,
    UserUpdate,
};
