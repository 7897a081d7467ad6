//! Request audit trail: capture, redaction and asynchronous persistence

mod entry;
mod pipeline;
mod redact;

pub use entry::{RequestSnapshot, build_entry};
pub use pipeline::{AuditLogger, AuditWriter, EnqueueOutcome};
pub use redact::{redact_login_body, redact_query, strip_whitespace};
