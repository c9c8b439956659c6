//! Resolution of Slack mention handles for a Backlog event.
//!
//! Backlog users are matched to Slack users by e-mail address. Matching is
//! exact and case-sensitive; the first Slack member with a given address
//! wins. Users that cannot be resolved on both sides are skipped.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{ChatDirectory, ChatUser, TrackerUser, WebhookEvent};

/// Per-request index over both directories.
struct DirectoryIndex<'a> {
    tracker_by_id: HashMap<i64, &'a TrackerUser>,
    chat_by_email: HashMap<&'a str, &'a ChatUser>,
}

impl<'a> DirectoryIndex<'a> {
    fn new(tracker_users: &'a [TrackerUser], chat: &'a ChatDirectory) -> Self {
        let mut tracker_by_id = HashMap::with_capacity(tracker_users.len());
        for user in tracker_users {
            tracker_by_id.entry(user.id).or_insert(user);
        }

        let mut chat_by_email = HashMap::with_capacity(chat.members.len());
        for member in &chat.members {
            if let Some(email) = member.profile.email.as_deref() {
                chat_by_email.entry(email).or_insert(member);
            }
        }

        Self {
            tracker_by_id,
            chat_by_email,
        }
    }

    /// Slack name for a Backlog user id.
    fn chat_name(&self, tracker_id: i64) -> Option<&'a str> {
        let tracker_user: &'a TrackerUser = self.tracker_by_id.get(&tracker_id).copied()?;
        let email = tracker_user.mail_address.as_deref()?;
        let member: &'a ChatUser = self.chat_by_email.get(email).copied()?;
        Some(member.name.as_str())
    }
}

/// Slack user names to mention for `event`, in order.
///
/// The assignee comes first unless they created or updated the event
/// themselves. Notified users follow in payload order. Names are unique.
#[must_use]
pub fn resolve_mentions(
    event: &WebhookEvent,
    tracker_users: &[TrackerUser],
    chat: &ChatDirectory,
) -> Vec<String> {
    let index = DirectoryIndex::new(tracker_users, chat);
    let mut names: Vec<String> = Vec::new();

    if let Some(assignee) = &event.content.assignee {
        let is_actor = [&event.created_user, &event.updated_user]
            .into_iter()
            .flatten()
            .any(|actor| actor.id == assignee.id);

        if is_actor {
            debug!(assignee = assignee.id, "Assignee is the actor, not mentioning");
        } else if let Some(name) = index.chat_name(assignee.id) {
            names.push(name.to_string());
        } else {
            debug!(assignee = assignee.id, "Assignee has no Slack account");
        }
    }

    for notification in &event.notifications {
        let Some(name) = index.chat_name(notification.user.id) else {
            debug!(user = notification.user.id, "Notified user not resolvable, skipping");
            continue;
        };
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }

    names
}
