//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{auth, health, logs, roles, users};
use crate::data::{AuditLogRow, RoleRow};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabTrack API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Laboratory sample tracking: sessions, users and audit log"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Login, logout and profile"),
        (name = "users", description = "User and role administration"),
        (name = "logs", description = "Request audit log")
    ),
    paths(
        health::health,
        auth::login,
        auth::logout,
        auth::auth_check,
        auth::profile,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        roles::list_roles,
        logs::list_logs,
    ),
    components(schemas(
        health::HealthResponse,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::MessageResponse,
        auth::AuthCheckResponse,
        auth::ProfileResponse,
        users::types::UserDto,
        users::types::UpdateUserRequest,
        RoleRow,
        AuditLogRow,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>LabTrack API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
