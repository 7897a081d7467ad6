//! Session endpoints: login, logout, auth check and profile

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::{AuthManager, CurrentUser, LoginError};
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    /// Epoch seconds
    pub token_expiry_date: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub username: String,
    pub display_name: Option<String>,
    pub role: Option<String>,
}

/// Routes reachable without a session
pub fn public_routes(auth_manager: Arc<AuthManager>) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(auth_manager)
}

/// Routes for an authenticated session
pub fn session_routes(auth_manager: Arc<AuthManager>) -> Router {
    Router::new()
        .route("/logout", post(logout))
        .route("/auth", get(auth_check))
        .route("/profile", get(profile))
        .with_state(auth_manager)
}

/// Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session started", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid username or password"),
        (status = 500, description = "Session could not be created")
    )
)]
pub async fn login(
    State(auth_manager): State<Arc<AuthManager>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let now = chrono::Utc::now().timestamp();
    match auth_manager
        .login(&request.username, &request.password, now)
        .await
    {
        Ok(issued) => Ok(Json(LoginResponse {
            access_token: issued.token,
            token_expiry_date: issued.expires_at,
        })),
        Err(LoginError::InvalidCredentials) => Err(ApiError::unauthorized(
            "INVALID_CREDENTIALS",
            "Invalid username or password",
        )),
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            Err(ApiError::internal("An error occurred when creating session"))
        }
    }
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(auth_manager): State<Arc<AuthManager>>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    auth_manager
        .logout(identity.id)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(MessageResponse {
        message: "User logged out successfully".to_string(),
    }))
}

/// Check that the bearer token is still valid
#[utoipa::path(
    get,
    path = "/api/v1/auth",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token is valid", body = AuthCheckResponse),
        (status = 401, description = "Missing, unknown or expired token")
    )
)]
pub async fn auth_check(CurrentUser(_identity): CurrentUser) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        authenticated: true,
    })
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile of the authenticated user", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile(CurrentUser(identity): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        username: identity.username,
        display_name: identity.display_name,
        role: identity.role_name,
    })
}
