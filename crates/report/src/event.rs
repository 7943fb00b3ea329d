//! CI webhook events.
//!
//! CI providers describe the triggering push or pull request in a JSON file;
//! only the fields the report needs are kept, everything else is ignored.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub commits: Vec<Commit>,
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub head: Head,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    pub sha: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// Reads the webhook event at `path`, if one is configured.
pub fn load_event(path: Option<&Path>) -> Result<Option<WebhookEvent>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let contents = std::fs::read(path).or_raise(|| ErrorKind::EventFile(path.to_path_buf()))?;
    let event: WebhookEvent = serde_json::from_slice(&contents).or_raise(|| ErrorKind::InvalidEvent)?;
    tracing::debug!(
        path = %path.display(),
        commits = event.commits.len(),
        pull_request = ?event.pull_request.as_ref().map(|pr| pr.number),
        "Loaded webhook event"
    );
    Ok(Some(event))
}
