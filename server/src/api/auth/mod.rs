//! Authentication module

pub mod bootstrap;
mod context;
mod extractors;
mod manager;
pub mod middleware;
pub mod password;
pub mod token;

pub use context::Identity;
pub use extractors::{AdminUser, AuthRejection, CurrentUser};
pub use manager::{AuthFailure, AuthManager, LoginError, RegisterError};
pub use middleware::{AuthError, AuthState, require_admin, require_auth};
pub use password::{PasswordError, PasswordService};
pub use token::{EntropySource, IssuedToken, OsEntropy, TokenError, TokenIssuer};
