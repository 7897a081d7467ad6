//! Row and parameter types shared by the data layer
//!
//! Types are backend-agnostic; the SQLite repositories map rows into them.

mod audit;
mod transactional;

pub use audit::{AuditLogFilter, AuditLogRow, HttpMethodFilter, NewAuditLog};
pub use transactional::{NewUser, RoleRow, UserRow, UserUpdate};
