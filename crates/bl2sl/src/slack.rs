//! Slack Web API client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::models::{ChatDirectory, ChatMessage, ChatUser, PostResult};

/// Access to the chat service.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Full workspace roster.
    async fn list_users(&self) -> Result<ChatDirectory, ClientError>;

    /// Post a message to a channel. Not idempotent.
    async fn post_message(
        &self,
        message: &ChatMessage,
        channel: Option<&str>,
    ) -> Result<PostResult, ClientError>;
}

/// Slack Web API client authenticated with a bot token.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl SlackClient {
    pub fn new(api_base: &str, bot_token: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.trim().to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<SlackResponse<T>, ClientError> {
        let response = request.bearer_auth(&self.bot_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(method = %method, status = %status, "Slack API request failed");
            return Err(ClientError::Status {
                service: "Slack",
                status: status.as_u16(),
                body,
            });
        }

        let response: SlackResponse<T> = response.json().await?;
        if !response.ok {
            let error = response
                .error
                .unwrap_or_else(|| "unknown_error".to_string());
            warn!(method = %method, error = %error, "Slack API returned an error");
            return Err(ClientError::SlackApi(error));
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatApi for SlackClient {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<ChatDirectory, ClientError> {
        let request = self.http.get(format!("{}/users.list", self.api_base));
        let response: SlackResponse<UsersList> = self.send("users.list", request).await?;

        debug!(count = response.body.members.len(), "Retrieved Slack users");
        Ok(ChatDirectory {
            members: response.body.members,
        })
    }

    #[instrument(skip(self, message))]
    async fn post_message(
        &self,
        message: &ChatMessage,
        channel: Option<&str>,
    ) -> Result<PostResult, ClientError> {
        let attachments = message.attachments_json()?;
        let mut form = vec![
            ("as_user", message.as_user.to_string()),
            ("attachments", attachments),
        ];
        if let Some(channel) = channel {
            form.push(("channel", channel.to_string()));
        }
        debug!(payload = ?form, "Posting Slack message");

        let request = self
            .http
            .post(format!("{}/chat.postMessage", self.api_base))
            .form(&form);
        let response: SlackResponse<PostedMessage> =
            self.send("chat.postMessage", request).await?;

        let result = PostResult {
            ok: response.ok,
            channel: response.body.channel,
            ts: response.body.ts,
        };
        debug!(result = ?result, "Slack message posted");
        Ok(result)
    }
}

// =============================================================================
// Slack API types
// =============================================================================

#[derive(Debug, Deserialize)]
struct SlackResponse<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Default, Deserialize)]
struct UsersList {
    #[serde(default)]
    members: Vec<ChatUser>,
}

#[derive(Debug, Default, Deserialize)]
struct PostedMessage {
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}
