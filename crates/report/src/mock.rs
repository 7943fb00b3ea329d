//! In-memory test doubles.

use crate::api::Transport;
use crate::error::{ErrorKind, Result};
use crate::telemetry::{Telemetry, TelemetryEvent};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Records every event it receives. A failing instance rejects reports but
/// still counts flushes.
#[derive(Debug, Default)]
pub struct MockTelemetry {
    events: RwLock<Vec<TelemetryEvent>>,
    flushes: AtomicUsize,
    fail: bool,
}
impl MockTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn events(&self) -> Vec<TelemetryEvent> {
        self.events.read().await.clone()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Telemetry for MockTelemetry {
    async fn report(&self, event: &TelemetryEvent) -> Result<()> {
        if self.fail {
            exn::bail!(ErrorKind::Telemetry);
        }
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Answers every post with a fixed status, keeping the bodies.
#[derive(Debug, Default)]
pub struct MockTransport {
    bodies: RwLock<Vec<Value>>,
    status: u16,
    fail: bool,
}
impl MockTransport {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn bodies(&self) -> Vec<Value> {
        self.bodies.read().await.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, body: &Value) -> Result<u16> {
        if self.fail {
            exn::bail!(ErrorKind::Transport);
        }
        self.bodies.write().await.push(body.clone());
        Ok(self.status)
    }
}
