//! Redaction of secrets before audit entries leave the request path

use serde_json::Value;

use crate::core::constants::AUDIT_MASK;

fn is_password_key(key: &str) -> bool {
    key.to_ascii_lowercase().contains("password")
}

/// Key as the query extractor sees it: `+` is a space, escapes decoded
fn decode_query_key(key: &str) -> String {
    let spaced = key.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

/// Mask the value of every query parameter whose key names a password.
///
/// Keys are matched after percent-decoding; the key is written back as
/// sent. Parameter order and encoding of the other pairs are kept.
pub fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| {
            let key = pair.split_once('=').map_or(pair, |(key, _)| key);
            if is_password_key(&decode_query_key(key)) {
                format!("{}={}", key, AUDIT_MASK)
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Mask password-like keys at any depth; returns how many values were masked
pub fn mask_json(value: &mut Value) -> usize {
    match value {
        Value::Object(map) => map
            .iter_mut()
            .map(|(key, v)| {
                if is_password_key(key) {
                    *v = Value::String(AUDIT_MASK.to_string());
                    1
                } else {
                    mask_json(v)
                }
            })
            .sum(),
        Value::Array(items) => items.iter_mut().map(mask_json).sum(),
        _ => 0,
    }
}

/// Redact a login request body.
///
/// A body that is not valid JSON cannot be inspected, so only the mask is
/// kept.
pub fn redact_login_body(body: &str) -> String {
    if body.trim().is_empty() {
        return String::new();
    }
    match serde_json::from_str::<Value>(body) {
        Ok(mut value) => {
            mask_json(&mut value);
            value.to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not parse login body for audit redaction");
            AUDIT_MASK.to_string()
        }
    }
}

/// Redact any JSON body; non-JSON bodies pass through unchanged
pub fn redact_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(mut value) => {
            if mask_json(&mut value) > 0 {
                value.to_string()
            } else {
                body.to_string()
            }
        }
        Err(_) => body.to_string(),
    }
}

/// Remove all Unicode whitespace
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
