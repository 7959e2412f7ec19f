use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_PATH: &str = "/chatkit";
pub const DEFAULT_DOMAIN_KEY: &str = "local-dev";
pub const DEFAULT_CORRELATION_HEADER: &str = "x-interview-id";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HIGHLIGHT_DECAY_MS: u64 = 3000;

/// Client configuration as stored in `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the clinic backend, without trailing slash.
    pub api_base_url: String,
    /// Path of the chat engine endpoint on the backend.
    pub chat_path: String,
    /// Domain key sent to the chat engine.
    pub domain_key: String,
    /// Header carrying the interview id on every chat request.
    pub correlation_header: String,
    pub request_timeout_secs: u64,
    /// How long the "recently updated" highlight stays on.
    pub highlight_decay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            domain_key: DEFAULT_DOMAIN_KEY.to_string(),
            correlation_header: DEFAULT_CORRELATION_HEADER.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            highlight_decay_ms: DEFAULT_HIGHLIGHT_DECAY_MS,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn highlight_decay(&self) -> Duration {
        Duration::from_millis(self.highlight_decay_ms)
    }

    /// Joins a path onto the API base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn chat_url(&self) -> String {
        self.endpoint(&self.chat_path)
    }
}
