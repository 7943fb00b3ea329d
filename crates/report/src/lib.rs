//! Everything a run sends outward: report payloads for the API, anonymous
//! telemetry, and the coordinated exit that lets telemetry flush first.

pub mod api;
pub mod error;
pub mod event;
mod exit;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod telemetry;

pub use crate::api::{ApiAction, ReportPayload, Transport, WriterTransport, send_finalize, send_to_api};
pub use crate::event::{WebhookEvent, load_event};
pub use crate::exit::{ExitCoordinator, ExitStatus};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::{MockTelemetry, MockTransport};
pub use crate::telemetry::{
    ERROR_EVENT, EventKind, RUN_EVENT, RunProperties, RunSummary, Telemetry, TelemetryEvent, TelemetryHandle,
    TelemetryReporter, TracingTelemetry,
};
