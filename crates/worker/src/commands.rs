//! Lifecycle command handlers (§4.7): deploy/start/stop/delete a container
//! on the local [`fleet_engine::ContainerLedger`] via the
//! [`fleet_adapters::RuntimeDriver`], reporting every state change back to
//! the coordinator as `CONTAINER_STATUS`, and the command's own outcome as
//! `ACK`/`ERROR`.
//!
//! Each handler is spawned as its own task by [`crate::connection::run`] and
//! takes the per-name [`crate::state::CommandLocks`] guard for its whole
//! duration, so two commands naming the same container never race the
//! runtime, while commands for distinct containers run concurrently (§5).

use std::sync::Arc;

use fleet_adapters::RuntimeDriver;
use fleet_core::{ContainerId, ContainerRecord, ContainerSpec, ContainerState};
use fleet_wire::{write_frame, ContainerStatusPayload, Message};

use crate::state::{WorkerState, COORDINATOR_ID};

pub async fn deploy(state: &Arc<WorkerState>, spec: ContainerSpec) {
    let lock = state.locks.lock_for(&spec.name);
    let _guard = lock.lock().await;

    let name = spec.name.clone();
    let record = ContainerRecord::new(state.node_id.clone(), spec.clone(), now_ms());
    let id = record.id.clone();
    state.ledger.insert(record);

    if let Err(e) = state.runtime.create(&spec).await {
        tracing::warn!(container = %name, error = %e, "failed to create container");
        transition(state, &id, ContainerState::Error).await;
        send(state, Message::Error(format!("{name} deployment failed"))).await;
        return;
    }

    if let Err(e) = state.runtime.start(&name).await {
        tracing::warn!(container = %name, error = %e, "failed to start newly deployed container");
        transition(state, &id, ContainerState::Error).await;
        send(state, Message::Error(format!("{name} deployment failed"))).await;
        return;
    }

    transition(state, &id, ContainerState::Running).await;
    send(state, Message::Ack(format!("{name} deployed"))).await;
}

pub async fn start(state: &Arc<WorkerState>, name: String) {
    let lock = state.locks.lock_for(&name);
    let _guard = lock.lock().await;

    let id = ContainerId::new(&state.node_id, &name);
    if state.ledger.get(&id).is_none() {
        send(state, Message::Error(format!("{name} not found"))).await;
        return;
    }

    transition(state, &id, ContainerState::Starting).await;
    match state.runtime.start(&name).await {
        Ok(()) => {
            transition(state, &id, ContainerState::Running).await;
            send(state, Message::Ack(format!("{name} started"))).await;
        }
        Err(e) => {
            tracing::warn!(container = %name, error = %e, "failed to start container");
            transition(state, &id, ContainerState::Error).await;
            send(state, Message::Error(format!("{name} start failed"))).await;
        }
    }
}

pub async fn stop(state: &Arc<WorkerState>, name: String) {
    let lock = state.locks.lock_for(&name);
    let _guard = lock.lock().await;

    let id = ContainerId::new(&state.node_id, &name);
    if state.ledger.get(&id).is_none() {
        send(state, Message::Error(format!("{name} not found"))).await;
        return;
    }

    transition(state, &id, ContainerState::Stopping).await;
    match state.runtime.stop(&name).await {
        Ok(()) => {
            transition(state, &id, ContainerState::Stopped).await;
            send(state, Message::Ack(format!("{name} stopped"))).await;
        }
        Err(e) => {
            tracing::warn!(container = %name, error = %e, "failed to stop container");
            transition(state, &id, ContainerState::Error).await;
            send(state, Message::Error(format!("{name} stop failed"))).await;
        }
    }
}

/// Idempotent on the worker side (§4.8, S5): a second `DELETE` for a name
/// this worker has already removed finds nothing in the local ledger and
/// replies `ERROR` without ever calling the [`fleet_adapters::RuntimeDriver`]
/// again.
pub async fn delete(state: &Arc<WorkerState>, name: String) {
    let lock = state.locks.lock_for(&name);
    let _guard = lock.lock().await;

    let id = ContainerId::new(&state.node_id, &name);
    if state.ledger.get(&id).is_none() {
        send(state, Message::Error(format!("{name} not found"))).await;
        return;
    }

    match state.runtime.destroy(&name).await {
        Ok(()) => {
            let _ = state.ledger.remove(&id);
            send(state, Message::Ack(format!("{name} deleted"))).await;
        }
        Err(e) => {
            tracing::warn!(container = %name, error = %e, "failed to delete container");
            transition(state, &id, ContainerState::Error).await;
            send(state, Message::Error(format!("{name} delete failed"))).await;
        }
    }
}

/// Apply a local transition and, if legal, push the resulting state as a
/// `CONTAINER_STATUS`. An illegal transition is dropped by the ledger and
/// logged there; nothing is sent.
async fn transition(state: &Arc<WorkerState>, id: &ContainerId, new_state: ContainerState) {
    if state.ledger.update_state(id, new_state).is_ok() {
        push_status(state, id).await;
    }
}

async fn push_status(state: &Arc<WorkerState>, id: &ContainerId) {
    let Some(record) = state.ledger.get(id) else { return };
    let payload = ContainerStatusPayload {
        id: record.id,
        name: record.name,
        node_id: record.node_id,
        state: record.state,
        started_at: record.started_at,
    };
    send(state, Message::ContainerStatus(payload)).await;
}

async fn send(state: &Arc<WorkerState>, message: Message) {
    let frame = match message.into_frame(state.node_id.as_str(), COORDINATOR_ID) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode outbound frame");
            return;
        }
    };
    let mut guard = state.conn.lock().await;
    if let Err(e) = write_frame(&mut *guard, &frame).await {
        tracing::warn!(error = %e, "failed to send frame to coordinator");
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}
