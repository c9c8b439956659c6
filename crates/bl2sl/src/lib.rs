//! Backlog to Slack notification bridge.
//!
//! This crate provides:
//! - Backlog REST client for project users and issue details
//! - Slack Web API client for the user roster and message posting
//! - Mention resolution (Backlog user -> Slack user by e-mail address)
//! - Slack attachment formatting for Backlog issue events
//! - HTTP server receiving Backlog webhooks (standalone service)
//!
//! # Configuration
//!
//! The service is configured via environment variables:
//!
//! - `SLACK_API_TOKEN`: Slack bot token
//! - `BACKLOG_BASE_URL`: Backlog space URL (e.g. `https://example.backlog.com`)
//! - `BACKLOG_API_KEY`: Backlog API key
//! - `SLACK_API_BASE_URL`: Slack Web API base (default `https://slack.com/api`)
//! - `BL2SL_PORT`: HTTP listen port (default `8080`)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Every upstream call can fail

pub mod backlog;
pub mod config;
pub mod directory;
pub mod error;
pub mod format;
pub mod mentions;
pub mod models;
pub mod server;
pub mod slack;

pub use backlog::{BacklogClient, TrackerApi};
pub use config::Config;
pub use error::{BridgeError, ClientError};
pub use format::format_message;
pub use mentions::resolve_mentions;
pub use models::*;
pub use slack::{ChatApi, SlackClient};
