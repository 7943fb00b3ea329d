//! Ending a run.
//!
//! Whatever the outcome, a run finishes through [`ExitCoordinator::finish`]:
//! telemetry gets its chance to flush, then the status goes back to `main`,
//! which is the only place the process exits.

use crate::telemetry::{RunProperties, TelemetryReporter};
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    #[default]
    Failure,
}
impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::SUCCESS,
            ExitStatus::Failure => ExitCode::FAILURE,
        }
    }
}

pub struct ExitCoordinator {
    reporter: TelemetryReporter,
    telemetry_disabled: bool,
}
impl ExitCoordinator {
    pub fn new(reporter: TelemetryReporter, telemetry_disabled: bool) -> Self {
        Self {
            reporter,
            telemetry_disabled,
        }
    }

    /// Reports the run (unless telemetry is disabled) and hands back the
    /// requested status, [`ExitStatus::Failure`] when none was given.
    pub async fn finish(&self, properties: &RunProperties, exit: Option<ExitStatus>) -> ExitStatus {
        let status = exit.unwrap_or_default();
        if self.telemetry_disabled {
            tracing::debug!(?status, "Telemetry disabled");
            return status;
        }
        self.reporter.send(properties).await;
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTelemetry;
    use rstest::rstest;
    use shotdiff_config::ShotModes;
    use std::sync::Arc;

    fn coordinator(client: Arc<MockTelemetry>, telemetry_disabled: bool) -> ExitCoordinator {
        ExitCoordinator::new(TelemetryReporter::new(client, &ShotModes::default()), telemetry_disabled)
    }

    #[rstest]
    #[case(Some(ExitStatus::Success), ExitStatus::Success)]
    #[case(Some(ExitStatus::Failure), ExitStatus::Failure)]
    #[case(None, ExitStatus::Failure)]
    #[tokio::test]
    async fn test_requested_status(#[case] exit: Option<ExitStatus>, #[case] expected: ExitStatus) {
        let client = Arc::new(MockTelemetry::new());
        let status = coordinator(client.clone(), false).finish(&RunProperties::default(), exit).await;
        assert_eq!(status, expected);
        assert_eq!(client.events().await.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_telemetry_sends_nothing() {
        let client = Arc::new(MockTelemetry::new());
        let status = coordinator(client.clone(), true).finish(&RunProperties::default(), Some(ExitStatus::Success)).await;
        assert_eq!(status, ExitStatus::Success);
        assert!(client.events().await.is_empty());
        assert_eq!(client.flushes(), 0);
    }

    #[tokio::test]
    async fn test_failing_telemetry_keeps_status() {
        let client = Arc::new(MockTelemetry::failing());
        let status = coordinator(client, false).finish(&RunProperties::failed("boom"), Some(ExitStatus::Success)).await;
        assert_eq!(status, ExitStatus::Success);
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::SUCCESS);
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::FAILURE);
    }
}
