//! Liveness reaper: periodically sweeps the node registry for workers that
//! have gone quiet and marks them `DISCONNECTED` (§4.3).
//!
//! Per §4.3, a heartbeat timeout does NOT touch the container ledger: "The
//! worker's containers are NOT deleted; their state remains as last
//! reported." Cascading owned containers to `Error` is solely the
//! TCP-connection-close path's responsibility (`fleet_coordinator::
//! connection::handle`), which observes the worker's socket actually
//! closing rather than a merely-stale heartbeat.
//!
//! Shaped like the teacher's background collectors: a `tokio::spawn`ed loop
//! on a fixed `tokio::time::interval`, returning a handle the caller can
//! drop (or `stop()`) to tear it down, rather than a side-thread or a
//! blocking timer.

use std::sync::Arc;
use std::time::Instant;

use fleet_core::{Clock, NodeId};

use crate::registry::NodeRegistry;
use crate::HEARTBEAT_TIMEOUT;

pub struct Reaper {
    handle: tokio::task::JoinHandle<()>,
}

impl Reaper {
    /// Spawn the background sweep loop.
    pub fn spawn<C, Clk>(registry: Arc<NodeRegistry<C>>, clock: Clk) -> Self
    where
        C: Send + Sync + 'static,
        Clk: Clock,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(crate::REAPER_INTERVAL);
            loop {
                interval.tick().await;
                sweep(&registry, clock.now());
            }
        });
        Self { handle }
    }

    /// Abort the sweep loop. Equivalent to dropping the handle.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Run one sweep: find `CONNECTED` workers whose heartbeat is older than
/// [`HEARTBEAT_TIMEOUT`] and mark them `DISCONNECTED` in the registry. Their
/// containers are left exactly as last reported (§4.3) — returns the ids
/// that were reaped.
pub fn sweep<C>(registry: &NodeRegistry<C>, now: Instant) -> Vec<NodeId> {
    let stale: Vec<NodeId> = registry
        .snapshot()
        .into_iter()
        .filter(|node| node.state == fleet_core::NodeState::Connected)
        .filter(|node| now.saturating_duration_since(node.last_heartbeat) > HEARTBEAT_TIMEOUT)
        .map(|node| node.id)
        .collect();

    for id in &stale {
        if registry.mark_disconnected(id).is_ok() {
            tracing::info!(%id, "reaped stale worker");
        }
    }

    stale
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
