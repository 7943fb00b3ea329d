//! Anonymous run telemetry.
//!
//! Telemetry is best effort: [`TelemetryReporter::send`] never fails a run.
//! Events carry a fresh random id, so nothing ties two runs together.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use serde::Serialize;
use shotdiff_config::ShotModes;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

pub const RUN_EVENT: &str = "shotdiff-run";
pub const ERROR_EVENT: &str = "shotdiff-error";

/// Receives telemetry events.
#[async_trait]
pub trait Telemetry: Send + Sync {
    async fn report(&self, event: &TelemetryEvent) -> Result<()>;
    /// Delivers anything still buffered.
    async fn flush(&self) -> Result<()>;
}

/// Shared, type-erased telemetry sink.
pub type TelemetryHandle = Arc<dyn Telemetry>;

/// What a finished (or failed) run reports about itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProperties {
    /// Seconds, millisecond precision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shots_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
impl RunProperties {
    pub fn finished(duration: Duration, shots_number: usize) -> Self {
        Self {
            run_duration: Some(seconds(duration)),
            shots_number: Some(shots_number),
            error: None,
        }
    }

    pub fn failed(error: impl Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn seconds(duration: Duration) -> f64 {
    duration.as_millis() as f64 / 1000.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shots_number: Option<usize>,
    pub version: String,
    pub modes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "properties")]
pub enum EventKind {
    #[serde(rename = "shotdiff-error")]
    Error(RunProperties),
    #[serde(rename = "shotdiff-run")]
    Run(RunSummary),
}
impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error(_) => ERROR_EVENT,
            Self::Run(_) => RUN_EVENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub distinct_id: Uuid,
    /// RFC 3339, UTC.
    pub timestamp: String,
    #[serde(flatten)]
    pub kind: EventKind,
}
impl TelemetryEvent {
    pub fn new(kind: EventKind) -> Result<Self> {
        let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).or_raise(|| ErrorKind::Telemetry)?;
        Ok(Self {
            distinct_id: Uuid::new_v4(),
            timestamp,
            kind,
        })
    }
}

/// Emits every event as a structured `tracing` record.
#[derive(Debug, Clone, Default)]
pub struct TracingTelemetry;

#[async_trait]
impl Telemetry for TracingTelemetry {
    async fn report(&self, event: &TelemetryEvent) -> Result<()> {
        let properties = serde_json::to_string(&event.kind).or_raise(|| ErrorKind::Serialize)?;
        tracing::info!(
            target: "shotdiff::telemetry",
            event = event.kind.name(),
            distinct_id = %event.distinct_id,
            timestamp = %event.timestamp,
            %properties,
            "Telemetry event"
        );
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Turns run properties into telemetry events.
#[derive(Clone)]
pub struct TelemetryReporter {
    client: TelemetryHandle,
    version: String,
    modes: Vec<String>,
}
impl TelemetryReporter {
    pub fn new(client: TelemetryHandle, modes: &ShotModes) -> Self {
        Self {
            client,
            version: env!("CARGO_PKG_VERSION").to_string(),
            modes: modes.names().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Runs that carry an error report only the error.
    pub fn event(&self, properties: &RunProperties) -> Result<TelemetryEvent> {
        let kind = if properties.is_error() {
            EventKind::Error(properties.clone())
        } else {
            EventKind::Run(RunSummary {
                run_duration: properties.run_duration,
                shots_number: properties.shots_number,
                version: self.version.clone(),
                modes: self.modes.clone(),
            })
        };
        TelemetryEvent::new(kind)
    }

    /// Reports and flushes. Failures are logged, never returned.
    pub async fn send(&self, properties: &RunProperties) {
        tracing::info!("Sending anonymized telemetry data");
        if let Err(err) = self.try_send(properties).await {
            tracing::warn!(error = ?err, "Error when sending telemetry data");
        }
        if let Err(err) = self.client.flush().await {
            tracing::warn!(error = ?err, "Error when flushing telemetry data");
        }
    }

    async fn try_send(&self, properties: &RunProperties) -> Result<()> {
        let event = self.event(properties)?;
        self.client.report(&event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTelemetry;
    use rstest::rstest;
    use shotdiff_shots::items::ShotMode;

    fn reporter(client: Arc<MockTelemetry>) -> TelemetryReporter {
        let modes: ShotModes = [ShotMode::Page, ShotMode::Storybook].into_iter().collect();
        TelemetryReporter::new(client, &modes).with_version("1.2.3")
    }

    #[rstest]
    #[case(Duration::from_millis(1234), 1.234)]
    #[case(Duration::from_micros(1_500_900), 1.5)]
    #[case(Duration::ZERO, 0.0)]
    fn test_duration_in_seconds(#[case] duration: Duration, #[case] expected: f64) {
        assert_eq!(RunProperties::finished(duration, 3).run_duration, Some(expected));
    }

    #[tokio::test]
    async fn test_run_event() {
        let client = Arc::new(MockTelemetry::new());
        reporter(client.clone()).send(&RunProperties::finished(Duration::from_millis(2500), 4)).await;

        let events = client.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(client.flushes(), 1);
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["event"], RUN_EVENT);
        assert_eq!(
            json["properties"],
            serde_json::json!({"runDuration": 2.5, "shotsNumber": 4, "version": "1.2.3", "modes": ["storybook", "pages"]})
        );
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn test_error_event() {
        let client = Arc::new(MockTelemetry::new());
        reporter(client.clone()).send(&RunProperties::failed("boom")).await;

        let events = client.events().await;
        assert_eq!(events[0].kind, EventKind::Error(RunProperties::failed("boom")));
        assert_eq!(events[0].kind.name(), ERROR_EVENT);
    }

    #[tokio::test]
    async fn test_fresh_id_per_event() {
        let client = Arc::new(MockTelemetry::new());
        let reporter = reporter(client.clone());
        reporter.send(&RunProperties::default()).await;
        reporter.send(&RunProperties::default()).await;
        let events = client.events().await;
        assert_ne!(events[0].distinct_id, events[1].distinct_id);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed_and_flushed() {
        let client = Arc::new(MockTelemetry::failing());
        reporter(client.clone()).send(&RunProperties::default()).await;
        assert!(client.events().await.is_empty());
        assert_eq!(client.flushes(), 1);
    }

    #[tokio::test]
    async fn test_tracing_telemetry() {
        let event = TelemetryEvent::new(EventKind::Error(RunProperties::failed("boom"))).unwrap();
        TracingTelemetry.report(&event).await.unwrap();
        TracingTelemetry.flush().await.unwrap();
    }
}
