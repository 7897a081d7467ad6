//! Audit log types

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;

/// Audit entry ready for insertion (already redacted)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditLog {
    /// Epoch seconds
    pub created_at: i64,
    /// Acting user id, or the anonymous sentinel
    pub actor_id: i64,
    pub method: String,
    /// `"<remote-addr> <path-and-query>"`
    pub request_url: String,
    pub request_body: String,
    pub response_code: u16,
}

/// Audit log row from database
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditLogRow {
    pub id: i64,
    pub created_at: i64,
    pub user_id: i64,
    pub http_method: String,
    pub request_url: String,
    pub request_body: String,
    pub response_code: i64,
    /// Present only when the listing asked for usernames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_username: Option<String>,
}

/// HTTP methods the log listing can filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethodFilter {
    Get,
    Post,
    Put,
    Update,
    Delete,
}

impl HttpMethodFilter {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethodFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("Invalid http_method: {}", s)),
        }
    }
}

/// Filters for listing audit entries
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub actor_id: Option<i64>,
    pub method: Option<HttpMethodFilter>,
    /// Join usernames; entries without a matching user get `Unknown`
    pub with_username: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_filter_case_insensitive() {
        assert_eq!("GET".parse::<HttpMethodFilter>(), Ok(HttpMethodFilter::Get));
        assert_eq!("Delete".parse::<HttpMethodFilter>(), Ok(HttpMethodFilter::Delete));
        assert_eq!("update".parse::<HttpMethodFilter>(), Ok(HttpMethodFilter::Update));
        assert!("patch".parse::<HttpMethodFilter>().is_err());
    }

    #[test]
    fn test_method_filter_display() {
        assert_eq!(HttpMethodFilter::Post.to_string(), "POST");
    }

    #[test]
    fn test_row_hides_username_when_absent() {
        let row = AuditLogRow {
            id: 1,
            created_at: 0,
            user_id: -1,
            http_method: "POST".into(),
            request_url: "127.0.0.1:1 /api/v1/login".into(),
            request_body: "{}".into(),
            response_code: 401,
            instance_username: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("instance_username").is_none());
    }
}
