//! Asynchronous ordered delivery.
//!
//! Each turn's answers are delivered by one spawned task, in issue order,
//! each at its computed offset from the start of the turn. A slow or
//! failing transport is logged and skipped; delivery never blocks the
//! conversation's turn lock.

use crate::bus::DispatchedAction;
use parlance_connector::{Connector, ConnectorCallback, ConnectorError};
use rootcause::Report;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{Instrument, debug, info_span, warn};

/// Outcome of delivering one turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Handle on a turn's delivery task.
///
/// Dropping the handle detaches the task; delivery continues.
#[derive(Debug)]
pub struct DeliveryHandle {
    task: Option<JoinHandle<DeliveryReport>>,
    total: usize,
}

impl DeliveryHandle {
    /// A handle for a turn with nothing to deliver.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            task: None,
            total: 0,
        }
    }

    /// Waits until every action was attempted.
    pub async fn wait(self) -> DeliveryReport {
        let Some(task) = self.task else {
            return DeliveryReport::default();
        };
        match task.await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "delivery task aborted");
                DeliveryReport {
                    delivered: 0,
                    failed: self.total,
                }
            }
        }
    }
}

/// Delivers turn batches through connectors.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    send_timeout: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher giving each `send` at most `send_timeout`.
    #[must_use]
    pub fn new(send_timeout: Duration) -> Self {
        Self { send_timeout }
    }

    /// Starts delivering `batch`, offsets counted from `turn_start`.
    pub fn dispatch(
        &self,
        batch: Vec<DispatchedAction>,
        connector: Arc<dyn Connector>,
        callback: ConnectorCallback,
        turn_start: Instant,
    ) -> DeliveryHandle {
        if batch.is_empty() {
            return DeliveryHandle::empty();
        }

        let total = batch.len();
        let span = info_span!(
            "deliver",
            connector_id = %callback.connector_id,
            actions = total
        );
        let task = tokio::spawn(
            deliver(batch, connector, callback, turn_start, self.send_timeout).instrument(span),
        );

        DeliveryHandle {
            task: Some(task),
            total,
        }
    }
}

async fn deliver(
    batch: Vec<DispatchedAction>,
    connector: Arc<dyn Connector>,
    callback: ConnectorCallback,
    turn_start: Instant,
    send_timeout: Duration,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for DispatchedAction { action, delay } in batch {
        sleep_until(turn_start + delay).await;

        let action_id = action.id;
        let result = match timeout(send_timeout, connector.send(action, &callback, delay)).await {
            Ok(result) => result,
            Err(_) => Err(ConnectorError::Timeout {
                connector_id: callback.connector_id.clone(),
                timeout_ms: send_timeout.as_millis() as u64,
            }
            .into()),
        };

        match result {
            Ok(()) => {
                debug!(action_id = %action_id, "action delivered");
                report.delivered += 1;
            }
            Err(error) => {
                warn!(action_id = %action_id, error = %error, "action delivery failed");
                report.failed += 1;
            }
        }
    }

    report
}
