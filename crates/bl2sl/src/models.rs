//! Backlog and Slack entity type definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Backlog webhook payload
// =============================================================================

/// Backlog webhook event as delivered to the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Activity identifier
    pub id: i64,
    /// Activity type code (1 = issue created, 2 = issue updated, ...)
    #[serde(rename = "type")]
    pub event_type: i64,
    /// Project the activity belongs to
    pub project: Project,
    /// Issue content
    pub content: EventContent,
    /// User who created the issue
    #[serde(default)]
    pub created_user: Option<UserRef>,
    /// User who performed the update
    #[serde(default)]
    pub updated_user: Option<UserRef>,
    /// Users Backlog notified about this activity
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

/// Issue type code for "issue created".
pub const EVENT_TYPE_ISSUE_CREATED: i64 = 1;

impl WebhookEvent {
    /// Parse a raw request body.
    ///
    /// The body must be a JSON object with a truthy `id`; anything else
    /// is rejected the same way.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.get("id").is_some_and(is_truthy) {
            return Err(serde::de::Error::missing_field("id"));
        }
        serde_json::from_value(value)
    }

    /// Composite issue identifier, e.g. `PROJ-5`.
    #[must_use]
    pub fn backlog_key(&self) -> String {
        format!("{}-{}", self.project.project_key, self.content.key_id)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Backlog project reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project key (e.g., "PROJ")
    pub project_key: String,
}

/// Issue content of a webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContent {
    /// Issue number within the project
    pub key_id: i64,
    /// Issue title
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub assignee: Option<UserRef>,
}

/// Comment attached to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub content: String,
}

/// User reference inside a webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Notification entry of a webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub user: UserRef,
}

// =============================================================================
// Backlog REST API
// =============================================================================

/// Backlog project member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUser {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mail_address: Option<String>,
}

/// Issue detail as returned by `GET /api/v2/issues/{key}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetail {
    pub status: IssueStatus,
    pub priority: Named,
    #[serde(default)]
    pub assignee: Option<Named>,
    #[serde(default)]
    pub updated_user: Option<Named>,
    pub issue_type: Named,
}

/// Issue status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueStatus {
    /// Status identifier (1 = open, 2 = in progress, 3 = resolved, 4 = closed)
    pub id: i64,
    pub name: String,
}

/// Any Backlog entity of which only the name is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

// =============================================================================
// Slack Web API
// =============================================================================

/// Slack workspace member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUser {
    /// Slack user name, used as the mention handle
    pub name: String,
    #[serde(default)]
    pub profile: ChatProfile,
}

/// Slack member profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatProfile {
    /// Absent for bots and restricted members
    #[serde(default)]
    pub email: Option<String>,
}

/// Slack workspace roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatDirectory {
    #[serde(default)]
    pub members: Vec<ChatUser>,
}

/// Outbound Slack message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub as_user: bool,
    pub attachments: Vec<Attachment>,
}

impl ChatMessage {
    /// Attachments encoded as a JSON string, as `chat.postMessage` expects.
    pub fn attachments_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.attachments)
    }
}

/// Slack legacy message attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub pretext: String,
    pub text: String,
    pub mrkdwn_in: Vec<String>,
    pub fields: Vec<Field>,
}

/// Slack attachment field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub value: String,
    pub short: bool,
}

/// Result of `chat.postMessage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostResult {
    pub ok: bool,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}
