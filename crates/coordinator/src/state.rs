//! Shared coordinator state: the node registry, container ledger, and the
//! bookkeeping for operator commands that must wait on a worker's reply.
//!
//! Global singletons per §9: constructed once at startup, destructed at
//! shutdown, created before the listener starts accepting connections.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{oneshot, Mutex as AsyncMutex};

use fleet_core::ContainerId;
use fleet_engine::{ContainerLedger, NodeRegistry};

/// The per-worker write half. Wrapped in an async mutex so operator
/// commands and the connection task's own replies never interleave their
/// frames on the wire.
pub type Conn = AsyncMutex<OwnedWriteHalf>;

/// Identifies the coordinator as the `sender_id` on outbound frames.
pub const COORDINATOR_ID: &str = "coordinator";

/// Deploy acknowledgment timeout (§4.6). Reused as the general
/// operator-command acknowledgment timeout (start/stop/delete) since the
/// spec names no separate figure for those.
pub const ACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of a worker's `ACK`/`ERROR` reply to an operator-issued command,
/// correlated back to the container it named.
pub type AckOutcome = Result<(), String>;

/// Registry of in-flight operator commands awaiting a worker's reply,
/// keyed by the container the command targets. Only `delete` currently
/// waits on this — start/stop are fire-and-forget, their effect observed
/// later via the worker's `CONTAINER_STATUS` pushes.
#[derive(Default)]
pub struct PendingAcks {
    inner: Mutex<HashMap<ContainerId, oneshot::Sender<AckOutcome>>>,
}

impl PendingAcks {
    pub fn register(&self, id: ContainerId) -> oneshot::Receiver<AckOutcome> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().insert(id, tx);
        rx
    }

    /// Resolve a pending wait, if one is registered for `id`. A miss is not
    /// an error — most `ACK`/`ERROR` frames (registration, heartbeated
    /// status) have nothing waiting on them.
    pub fn resolve(&self, id: &ContainerId, outcome: AckOutcome) {
        if let Some(tx) = self.inner.lock().remove(id) {
            let _ = tx.send(outcome);
        }
    }
}

pub struct CoordinatorState {
    pub registry: Arc<NodeRegistry<Conn>>,
    pub ledger: Arc<ContainerLedger>,
    pub pending: PendingAcks,
}

impl CoordinatorState {
    pub fn new() -> Self {
        Self { registry: Arc::new(NodeRegistry::new()), ledger: Arc::new(ContainerLedger::new()), pending: PendingAcks::default() }
    }
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self::new()
    }
}
