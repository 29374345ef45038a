//! HTTP client for the coaching service.
//!
//! Uses the synchronous `ureq` client with JSON bodies. One agent is built
//! per backend and reused for every request, so the session cookie and
//! timeout apply uniformly.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{
    ChatBackend, ChatReply, ChatRequest, GoalBackend, GoalRequest, StatusReply, TaskBackend,
    ToggleRequest,
};
use crate::config::schema::BackendConfig;

const CHAT_PATH: &str = "/plan/chat";
const TOGGLE_TASK_PATH: &str = "/plan/toggle_task";
const SAVE_GOAL_PATH: &str = "/plan/save_goal";

/// Timeout of the reachability probe used by `plancoach health`.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
    timeout: Duration,
    session_cookie: Option<String>,
}

impl HttpBackend {
    pub fn from_config(config: &BackendConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);

        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: normalize_base_url(&config.base_url),
            timeout,
            session_cookie: config.session_cookie.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST `body` as JSON to `path` and decode the JSON answer.
    ///
    /// Connection failures, timeouts, non-2xx statuses and undecodable
    /// bodies are all errors.
    fn post_json<T: Serialize, R: DeserializeOwned>(&self, path: &str, body: &T) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.agent.post(&url);
        if let Some(cookie) = &self.session_cookie {
            request = request.set("Cookie", cookie);
        }

        let response = request
            .send_json(body)
            .with_context(|| format!("POST {url} failed"))?;

        response
            .into_json()
            .with_context(|| format!("malformed response from {url}"))
    }

    /// Whether anything answers HTTP at the base URL. Error statuses count as
    /// reachable; only transport failures do not.
    pub fn is_reachable(&self) -> bool {
        match self.agent.get(&self.base_url).timeout(PROBE_TIMEOUT).call() {
            Ok(_) | Err(ureq::Error::Status(..)) => true,
            Err(_) => false,
        }
    }
}

/// Drop trailing slashes and pin a bare `localhost` host to IPv4.
///
/// `localhost` may resolve to `::1` first while the dev server only binds
/// IPv4. Hosts that merely start with `localhost` are left alone.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if let Some((scheme, rest)) = url.split_once("://")
        && let Some(after_host) = rest.strip_prefix("localhost")
        && (after_host.is_empty() || after_host.starts_with([':', '/']))
    {
        return format!("{scheme}://127.0.0.1{after_host}");
    }
    url.to_string()
}

impl ChatBackend for HttpBackend {
    fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.post_json(CHAT_PATH, request)
    }
}

impl TaskBackend for HttpBackend {
    fn toggle_task(&self, request: &ToggleRequest) -> Result<StatusReply> {
        self.post_json(TOGGLE_TASK_PATH, request)
    }
}

impl GoalBackend for HttpBackend {
    fn save_goal(&self, request: &GoalRequest) -> Result<StatusReply> {
        self.post_json(SAVE_GOAL_PATH, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_from_default_config() {
        let backend = HttpBackend::from_config(&BackendConfig::default());
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
        assert_eq!(backend.timeout(), Duration::from_millis(30_000));
    }

    #[test]
    fn base_url_is_normalized() {
        let config = BackendConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..BackendConfig::default()
        };
        let backend = HttpBackend::from_config(&config);
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn only_a_bare_localhost_host_is_rewritten() {
        assert_eq!(normalize_base_url("http://localhost"), "http://127.0.0.1");
        assert_eq!(
            normalize_base_url("http://localhost/api/"),
            "http://127.0.0.1/api"
        );
        assert_eq!(
            normalize_base_url("http://localhost.corp.example:5000"),
            "http://localhost.corp.example:5000"
        );
        assert_eq!(
            normalize_base_url("https://localhost-api.example.com/"),
            "https://localhost-api.example.com"
        );
        assert_eq!(
            normalize_base_url("https://coach.example.com"),
            "https://coach.example.com"
        );
    }
}
