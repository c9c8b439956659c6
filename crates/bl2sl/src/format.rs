//! Slack attachment formatting for Backlog events.

use crate::models::{
    Attachment, ChatMessage, Field, IssueDetail, WebhookEvent, EVENT_TYPE_ISSUE_CREATED,
};

/// Human label for a Backlog activity type code.
#[must_use]
pub const fn event_type_label(event_type: i64) -> &'static str {
    match event_type {
        1 => "課題の追加",
        2 => "課題の更新",
        3 => "課題にコメント",
        4 => "課題の削除",
        5 => "Wikiを追加",
        6 => "Wikiを更新",
        7 => "Wikiを削除",
        8 => "共有ファイルを追加",
        9 => "共有ファイルを更新",
        10 => "共有ファイルを削除",
        11 => "Subversionコミット",
        12 => "Gitプッシュ",
        13 => "Gitリポジトリ作成",
        14 => "課題をまとめて更新",
        15 => "プロジェクトに参加",
        16 => "プロジェクトから脱退",
        17 => "コメントにお知らせを追加",
        18 => "プルリクエストの追加",
        19 => "プルリクエストの更新",
        20 => "プルリクエストにコメント",
        _ => "",
    }
}

/// Sidebar color for a Backlog status id.
#[must_use]
pub const fn status_color(status_id: i64) -> Option<&'static str> {
    match status_id {
        1 => Some("#ed8077"), // 未対応
        2 => Some("#4488c5"), // 処理中
        3 => Some("#5eb5a6"), // 処理済み
        4 => Some("#b0be3c"), // 完了
        _ => None,
    }
}

/// Leading mention string, e.g. `<@alice> <@bob>\n`.
#[must_use]
pub fn mention_prefix(mentions: &[String]) -> String {
    if mentions.is_empty() {
        return String::new();
    }
    format!("<@{}>\n", mentions.join("> <@"))
}

/// Replace only the first newline. Later newlines are kept as they are.
fn inline_first_line(text: &str) -> String {
    text.replacen('\n', " ", 1)
}

fn short_field(label: &str, value: &str) -> Field {
    Field {
        title: None,
        value: format!("*{label}*: {value}"),
        short: true,
    }
}

fn long_field(title: &str, value: &str) -> Field {
    Field {
        title: Some(title.to_string()),
        value: inline_first_line(value),
        short: false,
    }
}

/// Build the Slack message for a Backlog event.
///
/// Pure: the same inputs always produce the same message.
#[must_use]
pub fn format_message(
    event: &WebhookEvent,
    issue: &IssueDetail,
    mentions: &[String],
    base_url: &str,
) -> ChatMessage {
    let backlog_key = event.backlog_key();
    let summary = &event.content.summary;
    let label = event_type_label(event.event_type);

    let mut fields = vec![
        short_field("状態", &issue.status.name),
        short_field("優先度", &issue.priority.name),
    ];

    if let Some(assignee) = &issue.assignee {
        fields.push(short_field("担当者", &assignee.name));
    }

    if let Some(updated_user) = &issue.updated_user {
        fields.push(short_field("更新者", &updated_user.name));
    }

    if event.event_type == EVENT_TYPE_ISSUE_CREATED {
        if let Some(description) = event.content.description.as_deref().filter(|d| !d.is_empty()) {
            fields.push(long_field("詳細", description));
        }
    }

    if let Some(comment) = &event.content.comment {
        fields.push(long_field("コメント", &comment.content));
    }

    let attachment = Attachment {
        fallback: format!("Backlog - {label}: {backlog_key} {summary}"),
        color: status_color(issue.status.id).map(str::to_string),
        pretext: format!("{}Backlog - {label}", mention_prefix(mentions)),
        text: format!(
            "【{}】<{base_url}/view/{backlog_key}|{backlog_key}> {summary}",
            issue.issue_type.name
        ),
        mrkdwn_in: ["pretext", "text", "fields"]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        fields,
    };

    ChatMessage {
        as_user: true,
        attachments: vec![attachment],
    }
}
