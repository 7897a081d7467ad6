//! Role listing (admin only)

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::types::ApiError;
use crate::data::{CredentialStore, RoleRow};

pub fn routes(store: Arc<dyn CredentialStore>) -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .with_state(store)
}

/// List all roles
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All roles", body = Vec<RoleRow>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_roles(
    State(store): State<Arc<dyn CredentialStore>>,
) -> Result<Json<Vec<RoleRow>>, ApiError> {
    let roles = store.list_roles().await.map_err(ApiError::from_data)?;
    Ok(Json(roles))
}
