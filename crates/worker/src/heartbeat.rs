//! Heartbeat task (§4.7): every 10 s, sample local resources via the
//! [`fleet_adapters::RuntimeDriver`] and push `NODE_HEARTBEAT`.
//!
//! Runs until a send fails, at which point it returns — `WorkerAgent::run`
//! races this against the receive loop, so either side failing ends the
//! connection's lifetime (§4.7: "any send or receive error causes the
//! worker to exit").

use std::sync::Arc;
use std::time::Duration;

use fleet_adapters::RuntimeDriver;
use fleet_wire::{write_frame, Message};

use crate::state::{WorkerState, COORDINATOR_ID};

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

pub async fn run(state: Arc<WorkerState>, runtime: Arc<dyn RuntimeDriver>) {
    let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
    loop {
        interval.tick().await;

        let sample = match runtime.sample_resources().await {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!(error = %e, "failed to sample local resources, skipping heartbeat");
                continue;
            }
        };

        let frame = match Message::NodeHeartbeat(sample).into_frame(state.node_id.as_str(), COORDINATOR_ID) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode heartbeat");
                continue;
            }
        };

        let mut guard = state.conn.lock().await;
        if let Err(e) = write_frame(&mut *guard, &frame).await {
            tracing::warn!(error = %e, "failed to send heartbeat, exiting");
            return;
        }
    }
}
