//! Report submission.
//!
//! A run talks to the reporting API in up to three steps (see [`ApiAction`]).
//! How the JSON body actually travels is behind the [`Transport`] trait; the
//! workspace ships [`WriterTransport`], which hands it to any [`Write`].

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use derive_more::Display;
use exn::{OptionExt, ResultExt};
use serde::Serialize;
use serde_json::{Map, Value};
use shotdiff_config::Config;
use std::io::Write;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiAction {
    #[display("init")]
    Init,
    #[display("result")]
    Result,
    #[display("finalize")]
    Finalize,
}

/// Identifies the run to the API; action-specific fields go in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub project_id: String,
    pub branch_name: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub commit: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
impl ReportPayload {
    pub fn from_config(config: &Config) -> Result<Self> {
        let project_id = config.project_id.clone().ok_or_raise(|| ErrorKind::Config)?;
        let branch_name = config.commit_ref_name.clone().ok_or_raise(|| ErrorKind::Config)?;
        let commit = config.commit_hash.clone().ok_or_raise(|| ErrorKind::Config)?;
        let (repo_owner, repo_name) = config.repository_parts().or_raise(|| ErrorKind::Config)?;
        Ok(Self {
            project_id,
            branch_name,
            repo_owner: repo_owner.to_string(),
            repo_name: repo_name.to_string(),
            commit,
            extra: Map::new(),
        })
    }

    /// Adds an action-specific field.
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(value).or_raise(|| ErrorKind::Serialize)?;
        self.extra.insert(key.into(), value);
        Ok(self)
    }

    /// The JSON body posted for `action`.
    pub fn body(&self, action: ApiAction) -> Result<Value> {
        let mut body = serde_json::to_value(self).or_raise(|| ErrorKind::Serialize)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("action".to_string(), Value::String(action.to_string()));
        }
        Ok(body)
    }
}

/// Delivers a JSON body and answers with an HTTP-like status code.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, body: &Value) -> Result<u16>;
}

/// Writes each body as one line of JSON. Always answers `200`.
pub struct WriterTransport<W> {
    writer: Mutex<W>,
}
impl<W: Write + Send> WriterTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}
impl WriterTransport<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

#[async_trait]
impl<W: Write + Send> Transport for WriterTransport<W> {
    async fn post(&self, body: &Value) -> Result<u16> {
        let mut writer = self.writer.lock().await;
        serde_json::to_writer(&mut *writer, body).or_raise(|| ErrorKind::Transport)?;
        writer.write_all(b"\n").or_raise(|| ErrorKind::Transport)?;
        writer.flush().or_raise(|| ErrorKind::Transport)?;
        Ok(200)
    }
}

/// Posts `payload` for `action`. Any transport failure or non-2xx status
/// fails the run.
pub async fn send_to_api(transport: &dyn Transport, action: ApiAction, payload: &ReportPayload) -> Result<()> {
    tracing::info!("Sending to API [{action}]");
    let body = payload.body(action)?;
    let status = match transport.post(&body).await {
        Ok(status) => status,
        Err(err) => {
            tracing::error!(%action, error = ?err, "Error when sending to API");
            return Err(err);
        },
    };
    if !(200..300).contains(&status) {
        tracing::error!(%action, status, "API rejected request");
        exn::bail!(ErrorKind::Rejected { action, status });
    }
    tracing::info!("Successfully sent to API [{action}]");
    Ok(())
}

/// Closes the build on the API side. Generate-only runs have nothing to close.
pub async fn send_finalize(transport: &dyn Transport, config: &Config) -> Result<()> {
    if config.generate_only {
        tracing::info!("Running in generate-only mode; skipping finalize");
        return Ok(());
    }
    let payload = ReportPayload::from_config(config)?;
    send_to_api(transport, ApiAction::Finalize, &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use rstest::rstest;

    fn config() -> Config {
        Config {
            project_id: Some("proj".to_string()),
            repository: Some("acme/site".to_string()),
            commit_ref_name: Some("main".to_string()),
            commit_hash: Some("abc123".to_string()),
            build_id: Some("42".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_payload_body() {
        let payload = ReportPayload::from_config(&config()).unwrap().with("durationsInMs", 12).unwrap();
        let body = payload.body(ApiAction::Result).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "projectId": "proj",
                "branchName": "main",
                "repoOwner": "acme",
                "repoName": "site",
                "commit": "abc123",
                "durationsInMs": 12,
                "action": "result",
            })
        );
    }

    #[test]
    fn test_payload_requires_repository() {
        let config = Config {
            repository: Some("no-slash".to_string()),
            ..config()
        };
        let err = ReportPayload::from_config(&config).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Config));
    }

    #[tokio::test]
    async fn test_writer_transport() {
        let transport = WriterTransport::new(Vec::new());
        let payload = ReportPayload::from_config(&config()).unwrap();
        send_to_api(&transport, ApiAction::Init, &payload).await.unwrap();
        let written = String::from_utf8(transport.into_inner()).unwrap();
        assert!(written.ends_with('\n'));
        let body: Value = serde_json::from_str(written.trim_end()).unwrap();
        assert_eq!(body["action"], "init");
        assert_eq!(body["projectId"], "proj");
    }

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(301, false)]
    #[case(500, false)]
    #[tokio::test]
    async fn test_status_handling(#[case] status: u16, #[case] ok: bool) {
        let transport = MockTransport::with_status(status);
        let payload = ReportPayload::from_config(&config()).unwrap();
        let result = send_to_api(&transport, ApiAction::Result, &payload).await;
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert!(matches!(&*err, ErrorKind::Rejected { action: ApiAction::Result, status: s } if *s == status));
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_fatal() {
        let transport = MockTransport::failing();
        let payload = ReportPayload::from_config(&config()).unwrap();
        let err = send_to_api(&transport, ApiAction::Init, &payload).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transport));
    }

    #[tokio::test]
    async fn test_finalize() {
        let transport = MockTransport::with_status(200);
        send_finalize(&transport, &config()).await.unwrap();
        let bodies = transport.bodies().await;
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["action"], "finalize");
        assert_eq!(bodies[0]["repoName"], "site");
    }

    #[tokio::test]
    async fn test_finalize_skipped_when_generate_only() {
        let transport = MockTransport::with_status(200);
        let config = Config {
            generate_only: true,
            ..Config::default()
        };
        send_finalize(&transport, &config).await.unwrap();
        assert!(transport.bodies().await.is_empty());
    }
}
