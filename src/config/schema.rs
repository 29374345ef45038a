/// Configuration schema and defaults for plancoach.
///
/// Defines the TOML-serializable structure with three sections:
/// `[backend]`, `[chat]` and `[logging]`. Every field has a built-in
/// default, so a config file only needs the keys it wants to change.
use serde::{Deserialize, Serialize};

use crate::chat::transcript::HISTORY_WINDOW;

/// Default base URL of the coaching service (Flask development server).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default HTTP timeout for backend requests.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level plancoach configuration.
///
/// Maps to `~/.plancoach/config.toml` and `.plancoach.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlancoachConfig {
    pub backend: BackendConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where and how to reach the coaching service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Service base URL, without a trailing path.
    pub base_url: String,
    /// Request timeout in milliseconds. Applies to every endpoint.
    pub timeout_ms: u64,
    /// Value of the `Cookie` header to send. The service's plan endpoints
    /// require a logged-in session; copy the cookie from a browser login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            session_cookie: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [chat]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Send recent turns with every message.
    pub send_history: bool,
    /// How many recent turns to send (including the new message).
    pub history_window: usize,
    /// Render assistant replies as markdown.
    pub markdown: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            send_history: true,
            history_window: HISTORY_WINDOW,
            markdown: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append activity entries to `~/.plancoach/activity.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl PlancoachConfig {
    /// Annotated config file written by `plancoach config init`.
    pub fn default_toml() -> String {
        r#"# plancoach configuration
#
# Precedence (highest wins):
#   1. Environment variables (PLANCOACH_*)
#   2. Project config (.plancoach.toml in the current directory)
#   3. User config (~/.plancoach/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://127.0.0.1:5000"
timeout_ms = 30000
# session_cookie = "session=..."   # copy from a logged-in browser session

[chat]
send_history = true     # include recent turns with each message
history_window = 10     # number of turns sent, newest message included
markdown = true         # render assistant replies as markdown

[logging]
enabled = true          # append to ~/.plancoach/activity.jsonl
"#
        .to_string()
    }
}
