//! Authentication and authorization middleware

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::context::Identity;
use super::manager::{AuthFailure, AuthManager};
use crate::api::types::ApiError;

/// Why a request was turned away by the auth layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No usable bearer token
    Required,
    /// Token matches no session
    Invalid,
    Expired,
    /// Authenticated but not an administrator
    AdminRequired,
    /// Store failure during lookup
    Lookup,
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Required => ApiError::unauthorized("AUTH_REQUIRED", "Unauthorized"),
            AuthError::Invalid => ApiError::unauthorized("TOKEN_INVALID", "Unauthorized"),
            AuthError::Expired => ApiError::unauthorized("TOKEN_EXPIRED", "Token expired"),
            AuthError::AdminRequired => ApiError::forbidden("ADMIN_REQUIRED", "Forbidden"),
            AuthError::Lookup => ApiError::internal("Authentication lookup failed"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
}

fn bearer_token(request: &Request) -> Option<String> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Authentication middleware
///
/// Resolves `Authorization: Bearer <token>` and injects the `Identity`
/// into request extensions. Never modifies the stored session.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(token) = bearer_token(&request) else {
        return Err(AuthError::Required);
    };

    let now = chrono::Utc::now().timestamp();
    let identity = match state.auth_manager.authenticate(&token, now).await {
        Ok(identity) => identity,
        Err(AuthFailure::Invalid) => return Err(AuthError::Invalid),
        Err(AuthFailure::Expired) => return Err(AuthError::Expired),
        Err(AuthFailure::Store(e)) => {
            tracing::error!(error = %e, "Token lookup failed");
            return Err(AuthError::Lookup);
        }
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Admin gate; must run inside `require_auth`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    let Some(identity) = request.extensions().get::<Identity>() else {
        tracing::error!(path = %request.uri().path(), "Admin gate reached without identity");
        return Err(AuthError::Required);
    };
    if !identity.is_admin() {
        tracing::debug!(user_id = identity.id, role_id = ?identity.role_id, "Admin role required");
        return Err(AuthError::AdminRequired);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::manager::tests::manager_with_store;
    use axum::Router;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tower::ServiceExt;

    async fn status_of(app: Router, auth: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let res = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn app() -> (Router, Arc<AuthManager>) {
        let (manager, _db) = manager_with_store().await;
        let manager = Arc::new(manager);
        let state = AuthState {
            auth_manager: manager.clone(),
        };
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(axum::middleware::from_fn(require_admin))
            .route_layer(axum::middleware::from_fn_with_state(state, require_auth));
        (router, manager)
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header() {
        let (router, _) = app().await;
        for header in [None, Some("Basic abc"), Some("Bearer "), Some("Bearer")] {
            let (status, body) = status_of(router.clone(), header).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{:?}", header);
            assert_eq!(body["code"], "AUTH_REQUIRED");
        }
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (router, _) = app().await;
        let (status, body) = status_of(router, Some("Bearer not-a-real-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "TOKEN_INVALID");
        assert_eq!(body["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let (router, manager) = app().await;
        manager.register("labuser1", "password1", None, 2).await.unwrap();
        let now = chrono::Utc::now().timestamp();
        let issued = manager.login("labuser1", "password1", now).await.unwrap();

        let (status, body) =
            status_of(router, Some(&format!("Bearer {}", issued.token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "ADMIN_REQUIRED");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let (router, manager) = app().await;
        manager.register("labuser1", "password1", None, 1).await.unwrap();
        // Issued 13 hours ago
        let then = chrono::Utc::now().timestamp() - 13 * 3600;
        let issued = manager.login("labuser1", "password1", then).await.unwrap();

        let (status, body) =
            status_of(router, Some(&format!("Bearer {}", issued.token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "TOKEN_EXPIRED");
        assert_eq!(body["message"], "Token expired");
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let (router, manager) = app().await;
        manager.register("boss-user", "password1", None, 1).await.unwrap();
        let now = chrono::Utc::now().timestamp();
        let issued = manager.login("boss-user", "password1", now).await.unwrap();

        let (status, _) = status_of(router, Some(&format!("Bearer {}", issued.token))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_gate_without_identity_is_401() {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(axum::middleware::from_fn(require_admin));
        let (status, body) = status_of(router, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTH_REQUIRED");
    }
}
