//! Audit log retrieval (admin only)

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::api::extractors::ValidatedQuery;
use crate::api::types::ApiError;
use crate::data::{AuditLogFilter, AuditLogRow, AuditStore, HttpMethodFilter};

/// Query parameters for listing audit entries
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogsQuery {
    /// Only entries recorded for this user id
    pub user_id: Option<i64>,
    /// Attach `instance_username` to each entry (1, t, T, TRUE, true, True, 0, f, ...)
    pub fill_username: Option<String>,
    /// One of get, post, put, update, delete (case-insensitive)
    pub http_method: Option<String>,
}

/// Boolean spellings accepted by `fill_username`
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl LogsQuery {
    fn into_filter(self) -> Result<AuditLogFilter, ApiError> {
        let with_username = match self.fill_username.as_deref() {
            None | Some("") => false,
            Some(value) => parse_bool(value).ok_or_else(|| {
                ApiError::bad_request(
                    "INVALID_FILL_USERNAME",
                    "fill_username must be a bool (1, t, T, TRUE, true, True)",
                )
            })?,
        };

        let method = match self.http_method.as_deref() {
            None | Some("") => None,
            Some(value) => Some(value.parse::<HttpMethodFilter>().map_err(|_| {
                ApiError::bad_request(
                    "INVALID_HTTP_METHOD",
                    "http_method must be one of: get, post, put, update, delete",
                )
            })?),
        };

        Ok(AuditLogFilter {
            actor_id: self.user_id,
            method,
            with_username,
        })
    }
}

pub fn routes(store: Arc<dyn AuditStore>) -> Router {
    Router::new()
        .route("/logs", get(list_logs))
        .with_state(store)
}

/// List audit entries, newest first
#[utoipa::path(
    get,
    path = "/api/v1/logs",
    tag = "logs",
    security(("bearer" = [])),
    params(LogsQuery),
    responses(
        (status = 200, description = "Audit entries", body = Vec<AuditLogRow>),
        (status = 400, description = "Invalid filter"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_logs(
    State(store): State<Arc<dyn AuditStore>>,
    ValidatedQuery(query): ValidatedQuery<LogsQuery>,
) -> Result<Json<Vec<AuditLogRow>>, ApiError> {
    let filter = query.into_filter()?;
    let logs = store
        .list_audit_logs(&filter)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(user_id: Option<i64>, fill: Option<&str>, method: Option<&str>) -> LogsQuery {
        LogsQuery {
            user_id,
            fill_username: fill.map(str::to_string),
            http_method: method.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_bool_spellings() {
        for s in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(s), Some(true), "{}", s);
        }
        for s in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(s), Some(false), "{}", s);
        }
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool("tRuE"), None);
    }

    #[test]
    fn test_filter_from_query() {
        let filter = query(Some(3), Some("t"), Some("Post")).into_filter().unwrap();
        assert_eq!(filter.actor_id, Some(3));
        assert!(filter.with_username);
        assert_eq!(filter.method, Some(HttpMethodFilter::Post));

        let filter = query(None, None, None).into_filter().unwrap();
        assert!(filter.actor_id.is_none());
        assert!(!filter.with_username);
        assert!(filter.method.is_none());
    }

    #[test]
    fn test_invalid_filters_rejected() {
        assert!(query(None, Some("maybe"), None).into_filter().is_err());
        assert!(query(None, None, Some("patch")).into_filter().is_err());
    }
}
