//! Turning a finished request into an audit entry

use std::net::SocketAddr;

use super::redact::{redact_body, redact_login_body, redact_query, strip_whitespace};
use crate::core::constants::ANONYMOUS_ACTOR_ID;
use crate::data::types::NewAuditLog;

/// What the audit layer saw of one request
#[derive(Debug, Clone)]
pub struct RequestSnapshot<'a> {
    pub method: &'a str,
    pub remote_addr: Option<SocketAddr>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub body: &'a [u8],
}

fn is_login_path(path: &str) -> bool {
    path.trim_end_matches('/').ends_with("/login")
}

/// Build the redacted entry for a request
pub fn build_entry(
    snapshot: &RequestSnapshot<'_>,
    actor_id: Option<i64>,
    response_code: u16,
    created_at: i64,
) -> NewAuditLog {
    let path_and_query = match snapshot.query {
        Some(q) if !q.is_empty() => format!("{}?{}", snapshot.path, redact_query(q)),
        _ => snapshot.path.to_string(),
    };
    let remote = snapshot
        .remote_addr
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let raw_body = String::from_utf8_lossy(snapshot.body);
    let body = if is_login_path(snapshot.path) {
        redact_login_body(&raw_body)
    } else {
        redact_body(&raw_body)
    };

    NewAuditLog {
        created_at,
        actor_id: actor_id.unwrap_or(ANONYMOUS_ACTOR_ID),
        method: snapshot.method.to_string(),
        request_url: format!("{} {}", remote, path_and_query),
        request_body: strip_whitespace(&body),
        response_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot<'a>(path: &'a str, query: Option<&'a str>, body: &'a [u8]) -> RequestSnapshot<'a> {
        RequestSnapshot {
            method: "POST",
            remote_addr: Some("10.0.0.5:41234".parse().unwrap()),
            path,
            query,
            body,
        }
    }

    #[test]
    fn test_login_entry_is_redacted() {
        let body = br#"{ "username": "labuser1", "password": "secret" }"#;
        let entry = build_entry(&snapshot("/api/v1/login", None, body), None, 401, 1_700_000_000);

        assert_eq!(entry.actor_id, -1);
        assert_eq!(entry.method, "POST");
        assert_eq!(entry.request_url, "10.0.0.5:41234 /api/v1/login");
        assert_eq!(entry.request_body, r#"{"username":"labuser1","password":"****"}"#);
        assert!(!entry.request_body.contains("secret"));
        assert_eq!(entry.response_code, 401);
        assert_eq!(entry.created_at, 1_700_000_000);
    }

    #[test]
    fn test_query_password_is_redacted() {
        let entry = build_entry(
            &snapshot(
                "/api/v1/users",
                Some("username=labuser1&password=hunter22&role_id=2"),
                b"",
            ),
            Some(1),
            201,
            0,
        );
        assert_eq!(
            entry.request_url,
            "10.0.0.5:41234 /api/v1/users?username=labuser1&password=****&role_id=2"
        );
        assert!(!entry.request_url.contains("hunter22"));
        assert_eq!(entry.actor_id, 1);
    }

    #[test]
    fn test_encoded_password_key_is_redacted() {
        let entry = build_entry(
            &snapshot(
                "/api/v1/users",
                Some("username=labuser2&p%61ssword=hunter22pw&role_id=2"),
                b"",
            ),
            Some(1),
            201,
            0,
        );
        assert!(!entry.request_url.contains("hunter22pw"));
        assert!(entry.request_url.ends_with("p%61ssword=****&role_id=2"));
    }

    #[test]
    fn test_body_whitespace_stripped() {
        let entry = build_entry(
            &snapshot("/api/v1/users", None, b"{\n  \"id\": 3,\n  \"display_name\": \"Lab Tech\"\n}"),
            Some(1),
            200,
            0,
        );
        assert_eq!(entry.request_body, r#"{"id":3,"display_name":"LabTech"}"#);
    }

    #[test]
    fn test_unknown_remote() {
        let mut snap = snapshot("/api/v1/health", None, b"");
        snap.remote_addr = None;
        let entry = build_entry(&snap, None, 200, 0);
        assert_eq!(entry.request_url, "unknown /api/v1/health");
    }

    #[test]
    fn test_is_login_path() {
        assert!(is_login_path("/api/v1/login"));
        assert!(is_login_path("/api/v1/login/"));
        assert!(!is_login_path("/api/v1/logout"));
        assert!(!is_login_path("/api/v1/loginx"));
    }
}
