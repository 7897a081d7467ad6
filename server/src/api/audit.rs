//! Request audit middleware
//!
//! Buffers the request body, runs the inner service and enqueues a redacted
//! entry with the final status. Never fails the request because of auditing.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::auth::Identity;
use super::types::ApiError;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::domain::audit::{AuditLogger, RequestSnapshot, build_entry};

pub async fn audit_requests(
    State(logger): State<AuditLogger>,
    request: Request,
    next: Next,
) -> Response {
    if !logger.is_enabled() {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();
    // Nested routers see a stripped URI
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.clone())
        .unwrap_or_else(|| parts.uri.clone());
    let path = uri.path().to_string();
    let query = uri.query().map(str::to_string);
    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let actor_id = parts.extensions.get::<Identity>().map(|identity| identity.id);

    let (bytes, response) = match axum::body::to_bytes(body, DEFAULT_BODY_LIMIT).await {
        Ok(bytes) => {
            let request = Request::from_parts(parts, Body::from(bytes.clone()));
            (bytes, next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path, "Request body rejected by audit layer");
            let response = ApiError::payload_too_large("Request body too large").into_response();
            (Default::default(), response)
        }
    };

    let snapshot = RequestSnapshot {
        method: &method,
        remote_addr,
        path: &path,
        query: query.as_deref(),
        body: &bytes,
    };
    let entry = build_entry(
        &snapshot,
        actor_id,
        response.status().as_u16(),
        chrono::Utc::now().timestamp(),
    );
    logger.record(entry);

    response
}
