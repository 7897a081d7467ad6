//! Identity extractors for Axum handlers
//!
//! `require_auth` puts the `Identity` in request extensions; these
//! extractors hand it to handlers.
//!
//! ```no_run
//! # use labtrack_server::api::auth::CurrentUser;
//! async fn profile(CurrentUser(identity): CurrentUser) -> String {
//!     identity.username
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use super::context::Identity;
use super::middleware::AuthError;

/// Rejection type for identity extractors
#[derive(Debug)]
pub enum AuthRejection {
    /// No identity; the route is not behind `require_auth`
    MissingIdentity,
    /// Identity present but not an admin
    NotAdmin,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingIdentity => AuthError::Required.into_response(),
            Self::NotAdmin => AuthError::AdminRequired.into_response(),
        }
    }
}

fn extract_identity(parts: &Parts) -> Result<Identity, AuthRejection> {
    parts
        .extensions
        .get::<Identity>()
        .cloned()
        .ok_or(AuthRejection::MissingIdentity)
}

/// Any authenticated user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_identity(parts).map(Self)
    }
}

/// Authenticated user holding the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = extract_identity(parts)?;
        if !identity.is_admin() {
            return Err(AuthRejection::NotAdmin);
        }
        Ok(Self(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts_with(identity: Option<Identity>) -> Parts {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        if let Some(identity) = identity {
            parts.extensions.insert(identity);
        }
        parts
    }

    fn identity(role_id: i64) -> Identity {
        Identity {
            id: 1,
            username: "someone".into(),
            display_name: None,
            role_id: Some(role_id),
            role_name: None,
        }
    }

    #[tokio::test]
    async fn test_current_user_requires_identity() {
        let err = CurrentUser::from_request_parts(&mut parts_with(None), &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);

        let CurrentUser(found) = CurrentUser::from_request_parts(&mut parts_with(Some(identity(2))), &())
            .await
            .unwrap();
        assert_eq!(found.username, "someone");
    }

    #[tokio::test]
    async fn test_admin_user_checks_role() {
        let err = AdminUser::from_request_parts(&mut parts_with(Some(identity(2))), &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

        let err = AdminUser::from_request_parts(&mut parts_with(None), &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);

        assert!(
            AdminUser::from_request_parts(&mut parts_with(Some(identity(1))), &())
                .await
                .is_ok()
        );
    }
}
