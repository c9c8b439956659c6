//! REST client for the Backlog API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::models::{IssueDetail, TrackerUser};

/// Read access to the issue tracker.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Members of a project.
    async fn project_users(&self, project_key: &str) -> Result<Vec<TrackerUser>, ClientError>;

    /// Issue detail for `{project_key}-{issue_number}`.
    async fn issue(&self, project_key: &str, issue_number: i64)
        -> Result<IssueDetail, ClientError>;
}

/// Backlog API v2 client authenticated with an API key.
#[derive(Debug, Clone)]
pub struct BacklogClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BacklogClient {
    /// Create a client for a Backlog space.
    ///
    /// # Arguments
    /// * `base_url` - Space URL, e.g. `https://example.backlog.com`
    /// * `api_key` - Personal API key, sent as the `apiKey` query parameter
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Space URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}/api/v2/{path}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, path = %path, "Backlog API request failed");
            return Err(ClientError::Status {
                service: "Backlog",
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TrackerApi for BacklogClient {
    #[instrument(skip(self))]
    async fn project_users(&self, project_key: &str) -> Result<Vec<TrackerUser>, ClientError> {
        let users: Vec<TrackerUser> = self.get(&format!("projects/{project_key}/users")).await?;
        debug!(count = users.len(), "Retrieved Backlog project users");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn issue(
        &self,
        project_key: &str,
        issue_number: i64,
    ) -> Result<IssueDetail, ClientError> {
        self.get(&format!("issues/{project_key}-{issue_number}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_project_users() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/projects/PROJ/users"))
            .and(query_param("apiKey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 1, "userId": "alice", "name": "Alice", "mailAddress": "alice@example.com" },
                { "id": 2, "userId": "bob", "name": "Bob", "mailAddress": null }
            ])))
            .mount(&server)
            .await;

        let client = BacklogClient::new(&format!("{}/", server.uri()), "secret").unwrap();
        let users = client.project_users("PROJ").await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].mail_address.as_deref(), Some("alice@example.com"));
        assert!(users[1].mail_address.is_none());
    }

    #[tokio::test]
    async fn test_issue_uses_composite_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/issues/PROJ-5"))
            .and(query_param("apiKey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": { "id": 1, "name": "Open" },
                "priority": { "name": "High" },
                "issueType": { "name": "Task" }
            })))
            .mount(&server)
            .await;

        let client = BacklogClient::new(&server.uri(), "secret").unwrap();
        let issue = client.issue("PROJ", 5).await.unwrap();

        assert_eq!(issue.status.name, "Open");
        assert_eq!(issue.priority.name, "High");
        assert!(issue.assignee.is_none());
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Authenticate error"))
            .mount(&server)
            .await;

        let client = BacklogClient::new(&server.uri(), "wrong").unwrap();
        let err = client.project_users("PROJ").await.unwrap_err();

        match err {
            ClientError::Status { status, body, .. } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Authenticate error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_base_url_fails_per_request() {
        let client = BacklogClient::new("", "").unwrap();
        assert!(matches!(
            client.project_users("PROJ").await,
            Err(ClientError::Http(_))
        ));
    }
}
