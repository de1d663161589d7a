//! Core data models for the summary-memory chat service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ChatError;

/// Longest accepted session key, in bytes
pub const MAX_SESSION_KEY_LEN: usize = 128;

//
// ================= Enums =================
//

/// Who produced a turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when a turn is rendered into a prompt or transcript
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "AI",
        }
    }
}

/// Whether a session has a persisted long-term summary yet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryState {
    NoSummary,
    HasSummary,
}

impl SummaryState {
    pub fn of(summary: &str) -> Self {
        if summary.is_empty() {
            SummaryState::NoSummary
        } else {
            SummaryState::HasSummary
        }
    }
}

//
// ================= Session Key =================
//

/// Validated session identifier.
///
/// Doubles as the file stem of the persisted summary, so anything that could
/// escape the storage directory is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn parse(raw: &str) -> Result<Self, ChatError> {
        let key = raw.trim();

        if key.is_empty() {
            return Err(ChatError::InvalidSessionKey(
                "session key is empty".to_string(),
            ));
        }

        if key.len() > MAX_SESSION_KEY_LEN {
            return Err(ChatError::InvalidSessionKey(format!(
                "session key longer than {} bytes",
                MAX_SESSION_KEY_LEN
            )));
        }

        if key.starts_with('.') || key.contains(['/', '\\', '\0']) {
            return Err(ChatError::InvalidSessionKey(format!(
                "session key {:?} is not a plain file name",
                key
            )));
        }

        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//
// ================= Turn =================
//

/// One role-tagged message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub turn_id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role.label(), self.content)
    }
}

//
// ================= Outcomes =================
//

/// Everything one user action produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub session_key: String,
    pub answer: String,
    pub summary: String,
    pub summary_state: SummaryState,
    pub recent_turns: Vec<Turn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStats {
    pub session_key: String,
    pub questions_asked: usize,
    pub live_turns: usize,
    pub summary_state: SummaryState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_trims_whitespace() {
        let key = SessionKey::parse("  alice ").unwrap();
        assert_eq!(key.as_str(), "alice");
    }

    #[test]
    fn test_session_key_rejects_paths() {
        for raw in ["", "   ", "../etc", "a/b", "a\\b", ".hidden", "nul\0byte"] {
            let result = SessionKey::parse(raw);
            assert!(
                matches!(result, Err(ChatError::InvalidSessionKey(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_session_key_rejects_overlong() {
        let raw = "k".repeat(MAX_SESSION_KEY_LEN + 1);
        assert!(SessionKey::parse(&raw).is_err());
        assert!(SessionKey::parse(&"k".repeat(MAX_SESSION_KEY_LEN)).is_ok());
    }

    #[test]
    fn test_summary_state() {
        assert_eq!(SummaryState::of(""), SummaryState::NoSummary);
        assert_eq!(SummaryState::of("Bob likes cats."), SummaryState::HasSummary);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Turn::assistant("hello")).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
        assert_eq!(Turn::user("Hi").to_string(), "User: Hi");
    }
}
