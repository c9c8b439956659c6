//! Configuration for the bridge service.

use std::env;

/// Default Slack Web API base URL.
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

/// Bridge service configuration.
///
/// Credentials are not validated at startup: a missing value is kept empty
/// and the corresponding upstream call fails for each request.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Slack bot token.
    pub slack_token: String,
    /// Slack Web API base URL.
    pub slack_api_url: String,
    /// Backlog space URL, e.g. `https://example.backlog.com`.
    pub backlog_base_url: String,
    /// Backlog API key.
    pub backlog_api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("BL2SL_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            slack_token: env::var("SLACK_API_TOKEN").unwrap_or_default(),
            slack_api_url: env::var("SLACK_API_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string()),
            backlog_base_url: env::var("BACKLOG_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            backlog_api_key: env::var("BACKLOG_API_KEY").unwrap_or_default(),
        }
    }
}

impl Config {
    /// Names of required variables that are unset or empty.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("SLACK_API_TOKEN", &self.slack_token),
            ("BACKLOG_BASE_URL", &self.backlog_base_url),
            ("BACKLOG_API_KEY", &self.backlog_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
