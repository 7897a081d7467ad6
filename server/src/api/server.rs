//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::audit::audit_requests;
use super::auth::{AuthManager, AuthState, require_admin, require_auth};
use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{auth, health, logs, roles, users};
use crate::core::CoreApp;
use crate::core::constants::{API_PREFIX, DEFAULT_BODY_LIMIT};
use crate::data::SqliteService;
use crate::domain::audit::AuditLogger;

/// Services the router is built from
#[derive(Clone)]
pub struct ApiState {
    pub auth_manager: Arc<AuthManager>,
    pub database: Arc<SqliteService>,
    pub audit: AuditLogger,
}

/// Build the full HTTP router.
///
/// Layer order per group, outermost first:
/// - public: audit, handler
/// - session: authentication, audit, handler
/// - admin: authentication, audit, admin gate, handler
pub fn router(state: ApiState, allowed_origins: &AllowedOrigins) -> Router {
    let ApiState {
        auth_manager,
        database,
        audit,
    } = state;
    let auth_state = AuthState {
        auth_manager: auth_manager.clone(),
    };

    let public_routes = auth::public_routes(auth_manager.clone())
        .route_layer(from_fn_with_state(audit.clone(), audit_requests));

    let session_routes = auth::session_routes(auth_manager.clone())
        .route_layer(from_fn_with_state(audit.clone(), audit_requests))
        .route_layer(from_fn_with_state(auth_state.clone(), require_auth));

    let admin_routes = Router::new()
        .merge(users::routes(auth_manager.clone()))
        .merge(roles::routes(auth_manager.store().clone()))
        .merge(logs::routes(database.clone()))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(audit, audit_requests))
        .route_layer(from_fn_with_state(auth_state, require_auth));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes);

    Router::new()
        .route(
            &format!("{}/health", API_PREFIX),
            get(health::health).with_state(database),
        )
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest(API_PREFIX, api_routes)
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let router = router(
            ApiState {
                auth_manager: app.auth.clone(),
                database: app.database.clone(),
                audit: app.audit.clone(),
            },
            &allowed_origins,
        );

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "Listening");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
