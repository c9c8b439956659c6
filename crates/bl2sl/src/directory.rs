//! Concurrent lookup of both user directories.

use tracing::debug;

use crate::backlog::TrackerApi;
use crate::error::BridgeError;
use crate::models::{ChatDirectory, TrackerUser};
use crate::slack::ChatApi;

/// Both user rosters for a single delivery.
#[derive(Debug, Clone, Default)]
pub struct Directories {
    pub tracker_users: Vec<TrackerUser>,
    pub chat: ChatDirectory,
}

/// Fetch the Backlog project members and the Slack roster concurrently.
///
/// Fails if either fetch fails; no partial result is returned.
pub async fn resolve_directories(
    tracker: &dyn TrackerApi,
    chat: &dyn ChatApi,
    project_key: &str,
) -> Result<Directories, BridgeError> {
    let (chat, tracker_users) = tokio::try_join!(
        chat.list_users(),
        tracker.project_users(project_key)
    )
    .map_err(BridgeError::UpstreamFetch)?;

    debug!(
        tracker_users = tracker_users.len(),
        chat_users = chat.members.len(),
        "Resolved user directories"
    );

    Ok(Directories {
        tracker_users,
        chat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::models::{ChatMessage, ChatProfile, ChatUser, IssueDetail, PostResult};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    struct Tracker(Option<Vec<TrackerUser>>);

    #[async_trait]
    impl TrackerApi for Tracker {
        async fn project_users(&self, _: &str) -> Result<Vec<TrackerUser>, ClientError> {
            self.0.clone().ok_or(ClientError::Status {
                service: "Backlog",
                status: 404,
                body: "No project.".to_string(),
            })
        }

        async fn issue(&self, _: &str, _: i64) -> Result<IssueDetail, ClientError> {
            unreachable!("not used by the directory join")
        }
    }

    struct Chat(Option<Vec<ChatUser>>);

    #[async_trait]
    impl ChatApi for Chat {
        async fn list_users(&self) -> Result<ChatDirectory, ClientError> {
            self.0
                .clone()
                .map(|members| ChatDirectory { members })
                .ok_or_else(|| ClientError::SlackApi("invalid_auth".to_string()))
        }

        async fn post_message(
            &self,
            _: &ChatMessage,
            _: Option<&str>,
        ) -> Result<PostResult, ClientError> {
            unreachable!("not used by the directory join")
        }
    }

    fn tracker_user() -> TrackerUser {
        TrackerUser {
            id: 1,
            name: "Alice".to_string(),
            mail_address: Some("alice@example.com".to_string()),
        }
    }

    fn chat_user() -> ChatUser {
        ChatUser {
            name: "alice".to_string(),
            profile: ChatProfile {
                email: Some("alice@example.com".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_both_directories_resolved() {
        let dirs = resolve_directories(
            &Tracker(Some(vec![tracker_user()])),
            &Chat(Some(vec![chat_user()])),
            "PROJ",
        )
        .await
        .unwrap();

        assert_eq!(dirs.tracker_users.len(), 1);
        assert_eq!(dirs.chat.members.len(), 1);
    }

    #[tokio::test]
    async fn test_tracker_failure_fails_join() {
        let err = resolve_directories(&Tracker(None), &Chat(Some(vec![chat_user()])), "PROJ")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::UpstreamFetch(ClientError::Status { .. })));
    }

    #[tokio::test]
    async fn test_chat_failure_fails_join() {
        let err = resolve_directories(&Tracker(Some(vec![tracker_user()])), &Chat(None), "PROJ")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::UpstreamFetch(ClientError::SlackApi(_))));
    }

    /// Tracker that only answers once the chat fetch is in flight too.
    struct RendezvousTracker(Arc<Barrier>);

    #[async_trait]
    impl TrackerApi for RendezvousTracker {
        async fn project_users(&self, _: &str) -> Result<Vec<TrackerUser>, ClientError> {
            self.0.wait().await;
            Ok(vec![tracker_user()])
        }

        async fn issue(&self, _: &str, _: i64) -> Result<IssueDetail, ClientError> {
            unreachable!("not used by the directory join")
        }
    }

    /// Chat roster that only answers once the tracker fetch is in flight too.
    struct RendezvousChat(Arc<Barrier>);

    #[async_trait]
    impl ChatApi for RendezvousChat {
        async fn list_users(&self) -> Result<ChatDirectory, ClientError> {
            self.0.wait().await;
            Ok(ChatDirectory {
                members: vec![chat_user()],
            })
        }

        async fn post_message(
            &self,
            _: &ChatMessage,
            _: Option<&str>,
        ) -> Result<PostResult, ClientError> {
            unreachable!("not used by the directory join")
        }
    }

    #[tokio::test]
    async fn test_directories_fetched_concurrently() {
        // Each fetch blocks until the other has started; a sequential join
        // never completes.
        let barrier = Arc::new(Barrier::new(2));
        let tracker = RendezvousTracker(barrier.clone());
        let chat = RendezvousChat(barrier);

        let dirs = tokio::time::timeout(
            Duration::from_secs(5),
            resolve_directories(&tracker, &chat, "PROJ"),
        )
        .await
        .expect("directory fetches did not run concurrently")
        .unwrap();

        assert_eq!(dirs.tracker_users.len(), 1);
        assert_eq!(dirs.chat.members.len(), 1);
    }
}
