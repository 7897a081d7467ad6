//! User administration endpoints (admin only)

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::{AdminUser, AuthManager, RegisterError};
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::data::UserUpdate;

use types::{CreateUserQuery, DeleteUserQuery, UpdateUserRequest, UserDto};

/// Build Users API routes
pub fn routes(auth_manager: Arc<AuthManager>) -> Router {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .post(create_user)
                .put(update_user)
                .delete(delete_user),
        )
        .with_state(auth_manager)
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserDto>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(auth_manager): State<Arc<AuthManager>>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = auth_manager
        .store()
        .list_users()
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer" = [])),
    params(CreateUserQuery),
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Invalid input, unknown role or duplicate username"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create_user(
    State(auth_manager): State<Arc<AuthManager>>,
    ValidatedQuery(query): ValidatedQuery<CreateUserQuery>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    // New accounts start with their username as display name
    let display_name = Some(query.username.clone());
    let user = auth_manager
        .register(&query.username, &query.password, display_name, query.role_id)
        .await
        .map_err(|e| match e {
            RegisterError::UnknownRole => ApiError::bad_request("INVALID_ROLE", "Invalid role"),
            RegisterError::UsernameTaken => {
                ApiError::bad_request("USERNAME_TAKEN", "Username already exists")
            }
            RegisterError::Store(e) => ApiError::from_data(e),
            RegisterError::Password(e) => {
                tracing::error!(error = %e, "Password hashing failed");
                ApiError::internal("Failed to create user")
            }
        })?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Update display name or role
#[utoipa::path(
    put,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Invalid role"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(auth_manager): State<Arc<AuthManager>>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let store = auth_manager.store();

    if let Some(role_id) = request.role_id {
        let role = store.get_role(role_id).await.map_err(ApiError::from_data)?;
        if role.is_none() {
            return Err(ApiError::bad_request("INVALID_ROLE", "Invalid role"));
        }
    }

    let update = UserUpdate {
        display_name: request.display_name,
        role_id: request.role_id,
    };
    let user = store
        .update_user(request.id, &update)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))?;

    tracing::info!(user_id = user.id, "User updated");
    Ok(Json(UserDto::from(user)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer" = [])),
    params(DeleteUserQuery),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(auth_manager): State<Arc<AuthManager>>,
    AdminUser(admin): AdminUser,
    ValidatedQuery(query): ValidatedQuery<DeleteUserQuery>,
) -> Result<StatusCode, ApiError> {
    if admin.id == query.id {
        return Err(ApiError::bad_request(
            "SELF_DELETE",
            "Cannot delete your own account",
        ));
    }

    let deleted = auth_manager
        .store()
        .delete_user(query.id)
        .await
        .map_err(ApiError::from_data)?;
    if !deleted {
        return Err(ApiError::not_found("USER_NOT_FOUND", "User not found"));
    }

    tracing::info!(user_id = query.id, deleted_by = admin.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
