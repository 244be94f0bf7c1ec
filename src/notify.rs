//! User-facing notices
//!
//! Every failed admin action ends as a transient [`Notice`]. Server messages are shown
//! when the response carries one; otherwise a generic fallback is used.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidationErrors;

pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
/// Key validator files schema-level errors under.
const FORM_WIDE: &str = "__all__";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level { Success, Info, Error }

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), level, message: message.into() }
    }
    pub fn success(message: impl Into<String>) -> Self { Self::new(Level::Success, message) }
    pub fn error(message: impl Into<String>) -> Self { Self::new(Level::Error, message) }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("request failed with status {status}")]
    Http { status: u16, body: Option<String> },

    #[error("could not reach the server: {0}")]
    Transport(String),

    #[error("form is incomplete: {0}")]
    Validation(#[from] ValidationErrors),
}

impl AdminError {
    pub fn is_unauthorized(&self) -> bool { matches!(self, AdminError::Http { status: 401, .. }) }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Message carried by a JSON error body, if any.
pub fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.or(parsed.error).map(|m| m.trim().to_string()).filter(|m| !m.is_empty())
}

/// Form-wide rule messages first, then the names of the offending fields.
fn validation_message(errors: &ValidationErrors) -> String {
    let by_field = errors.field_errors();
    let mut parts: Vec<String> = by_field.get(FORM_WIDE).into_iter().flat_map(|list| list.iter())
        .map(|e| e.message.as_deref().unwrap_or(e.code.as_ref()).to_string())
        .collect();

    let mut fields: Vec<&str> = by_field.keys().copied().filter(|k| *k != FORM_WIDE).collect();
    fields.sort_unstable();
    if !fields.is_empty() { parts.push(format!("Please check: {}", fields.join(", "))); }

    if parts.is_empty() { "Please check the form and try again.".to_string() } else { parts.join(". ") }
}

impl From<&AdminError> for Notice {
    fn from(err: &AdminError) -> Self {
        let message = match err {
            AdminError::Http { status: 401, .. } => SESSION_EXPIRED_MESSAGE.to_string(),
            AdminError::Http { body, .. } => body.as_deref().and_then(server_message).unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            AdminError::Transport(_) => FALLBACK_MESSAGE.to_string(),
            AdminError::Validation(errors) => validation_message(errors),
        };
        tracing::debug!(error = %err, %message, "admin action failed");
        Notice::error(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_preferred() {
        let err = AdminError::Http { status: 409, body: Some(r#"{"message":"Coupon code already exists"}"#.into()) };
        let notice = Notice::from(&err);
        assert_eq!(notice.level, Level::Error);
        assert_eq!(notice.message, "Coupon code already exists");
    }

    #[test]
    fn test_fallback_without_message() {
        for body in [None, Some("<html>bad gateway</html>".to_string()), Some(r#"{"message":"  "}"#.to_string())] {
            let notice = Notice::from(&AdminError::Http { status: 502, body });
            assert_eq!(notice.message, FALLBACK_MESSAGE);
        }
        assert_eq!(Notice::from(&AdminError::Transport("timeout".into())).message, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_unauthorized() {
        let err = AdminError::Http { status: 401, body: None };
        assert!(err.is_unauthorized());
        assert_eq!(Notice::from(&err).message, SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn test_error_field_used() {
        assert_eq!(server_message(r#"{"error":"Not found"}"#).as_deref(), Some("Not found"));
    }
}
