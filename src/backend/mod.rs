//! Contracts for the coaching service endpoints the client talks to.
//!
//! Three collaborators, each a small trait so sessions and dashboards can be
//! driven by fakes in tests and by [`http::HttpBackend`] in the CLI:
//!
//! - [`ChatBackend`]: `POST /plan/chat`
//! - [`TaskBackend`]: `POST /plan/toggle_task`
//! - [`GoalBackend`]: `POST /plan/save_goal`
//!
//! Every endpoint answers HTTP 200 with a JSON body carrying a `status`
//! field; anything other than `"success"` is a business-level failure.
//! Transport failures (connection refused, timeouts, non-2xx, malformed
//! bodies) surface as `Err`.

pub mod http;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::chat::Turn;

/// Status value the service uses for a successful call.
pub const STATUS_SUCCESS: &str = "success";

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Body of `POST /plan/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    /// Recent turns, oldest first. Omitted entirely when history sending is
    /// turned off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Turn>>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, history: Option<Vec<Turn>>) -> Self {
        Self {
            message: message.into(),
            history,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.as_ref().map_or(0, Vec::len)
    }
}

/// Response of `POST /plan/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub status: String,
    #[serde(default)]
    pub reply: String,
    /// Set when the service persisted a new daily plan from this turn.
    #[serde(default)]
    pub updated_plan: bool,
    /// Some validation failures carry `message` instead of `reply`.
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatReply {
    pub fn success(reply: impl Into<String>, updated_plan: bool) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            reply: reply.into(),
            updated_plan,
            message: None,
        }
    }

    pub fn failure(status: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            reply: reply.into(),
            updated_plan: false,
            message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Text to show the user: `reply`, falling back to `message`.
    pub fn text(&self) -> &str {
        if self.reply.is_empty() {
            self.message.as_deref().unwrap_or_default()
        } else {
            &self.reply
        }
    }
}

pub trait ChatBackend {
    fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply>;
}

// ---------------------------------------------------------------------------
// Dashboard: task toggle and goal save
// ---------------------------------------------------------------------------

/// Body of `POST /plan/toggle_task`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleRequest {
    pub plan_id: u64,
    pub task_idx: usize,
}

/// Body of `POST /plan/save_goal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalRequest {
    pub goal_type: String,
}

/// Bare `{status, message?}` response used by the dashboard endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusReply {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusReply {
    pub fn success() -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: None,
        }
    }

    pub fn error(message: Option<&str>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.map(str::to_string),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

pub trait TaskBackend {
    fn toggle_task(&self, request: &ToggleRequest) -> Result<StatusReply>;
}

pub trait GoalBackend {
    fn save_goal(&self, request: &GoalRequest) -> Result<StatusReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_omits_disabled_history() {
        let request = ChatRequest::new("hi", None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "hi" }));
    }

    #[test]
    fn chat_request_serializes_history_turns() {
        let request = ChatRequest::new("hi", Some(vec![Turn::user("hi")]));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "hi",
                "history": [{ "role": "user", "content": "hi" }]
            })
        );
        assert_eq!(request.history_len(), 1);
    }

    #[test]
    fn chat_reply_defaults_missing_fields() {
        let reply: ChatReply = serde_json::from_str(r#"{"status":"success","reply":"ok"}"#).unwrap();
        assert!(reply.is_success());
        assert!(!reply.updated_plan);
    }

    #[test]
    fn chat_reply_text_falls_back_to_message() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"status":"error","message":"empty input"}"#).unwrap();
        assert!(!reply.is_success());
        assert_eq!(reply.text(), "empty input");
    }

    #[test]
    fn toggle_request_wire_shape() {
        let json = serde_json::to_value(ToggleRequest {
            plan_id: 7,
            task_idx: 2,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "plan_id": 7, "task_idx": 2 }));
    }
}
