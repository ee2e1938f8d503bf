//! Shared worker state: identity, the local container ledger (authoritative
//! for runtime truth per §3), the runtime adapter, and the serialized
//! connection write-half.
//!
//! Reuses `fleet_engine::ContainerLedger` rather than a second ledger type —
//! the worker's copy is keyed the same way (`ContainerId -> ContainerRecord`,
//! `NodeId -> {ContainerId}`), it just has exactly one `NodeId` in it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex as AsyncMutex;

use fleet_adapters::RuntimeDriver;
use fleet_core::NodeId;
use fleet_engine::ContainerLedger;

/// The coordinator-facing write half, serialized so the heartbeat task and
/// per-command reply tasks never interleave frames on the wire.
pub type Conn = AsyncMutex<OwnedWriteHalf>;

/// Identifies the coordinator as the `recipient_id` on outbound frames.
pub const COORDINATOR_ID: &str = "coordinator";

/// Per-container serialization locks (§5: "commands to the RuntimeDriver on
/// a worker serialize per-container by construction"). Each name maps to an
/// async mutex that a command task holds for the duration of its
/// create/start/stop/destroy call; distinct names never contend.
#[derive(Default)]
pub struct CommandLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl CommandLocks {
    pub fn lock_for(&self, name: &str) -> Arc<AsyncMutex<()>> {
        let mut inner = self.inner.lock();
        inner.entry(name.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }
}

pub struct WorkerState {
    pub node_id: NodeId,
    pub ledger: Arc<ContainerLedger>,
    pub runtime: Arc<dyn RuntimeDriver>,
    pub conn: Arc<Conn>,
    pub locks: CommandLocks,
}

impl WorkerState {
    pub fn new(node_id: NodeId, runtime: Arc<dyn RuntimeDriver>, conn: Arc<Conn>) -> Self {
        Self { node_id, ledger: Arc::new(ContainerLedger::new()), runtime, conn, locks: CommandLocks::default() }
    }
}
