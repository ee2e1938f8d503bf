//! Operator-initiated operations (§4.6): `deploy`, `start`, `stop`,
//! `delete`. Serviced by the coordinator process itself, not by a peer
//! connection task.

use std::sync::{Arc, Weak};
use std::time::Instant;

use fleet_core::{ContainerId, ContainerRecord, ContainerSpec, ContainerState, NodeId, NodeState};
use fleet_engine::pick_node;
use fleet_wire::{write_frame, Message};

use crate::error::CoordinatorError;
use crate::state::{Conn, CoordinatorState, ACK_TIMEOUT, COORDINATOR_ID};

/// Place `spec` on the best live worker, insert it into the ledger as
/// `STARTING`, and dispatch `DEPLOY_CONTAINER`. The `RUNNING` transition
/// arrives later via the worker's `CONTAINER_STATUS` push; a background
/// watchdog forces `ERROR` if nothing arrives within [`ACK_TIMEOUT`].
pub async fn deploy(state: &Arc<CoordinatorState>, spec: ContainerSpec) -> Result<ContainerId, CoordinatorError> {
    let node_id = pick_node(&state.registry, &spec, Instant::now()).map_err(|_| CoordinatorError::NoCapacity)?;

    let record = ContainerRecord::new(node_id.clone(), spec.clone(), now_ms());
    let container_id = record.id.clone();
    state.ledger.insert(record);
    let _ = state.registry.attach_container(&node_id, container_id.clone());

    let conn = match connected_conn(state, &node_id) {
        Ok(conn) => conn,
        Err(e) => {
            let _ = state.ledger.update_state(&container_id, ContainerState::Error);
            return Err(e);
        }
    };

    if let Err(e) = send(&conn, Message::DeployContainer(spec), &node_id).await {
        let _ = state.ledger.update_state(&container_id, ContainerState::Error);
        return Err(e);
    }

    spawn_deploy_watchdog(Arc::clone(state), container_id.clone());
    Ok(container_id)
}

fn spawn_deploy_watchdog(state: Arc<CoordinatorState>, container_id: ContainerId) {
    tokio::spawn(async move {
        tokio::time::sleep(ACK_TIMEOUT).await;
        if let Some(record) = state.ledger.get(&container_id) {
            if record.state == ContainerState::Starting {
                tracing::warn!(%container_id, "deploy acknowledgment timed out");
                let _ = state.ledger.update_state(&container_id, ContainerState::Error);
            }
        }
    });
}

/// Send `START_CONTAINER` to the owning worker. Fire-and-forget: the
/// `STOPPED -> STARTING` transition is applied by the coordinator when the
/// worker's own `CONTAINER_STATUS` push reports it.
pub async fn start(state: &Arc<CoordinatorState>, container_id: &ContainerId) -> Result<(), CoordinatorError> {
    let record = lookup(state, container_id)?;
    let conn = connected_conn(state, &record.node_id)?;
    send(&conn, Message::StartContainer { name: record.name }, &record.node_id).await
}

/// Send `STOP_CONTAINER` to the owning worker. Fire-and-forget, mirroring
/// [`start`].
pub async fn stop(state: &Arc<CoordinatorState>, container_id: &ContainerId) -> Result<(), CoordinatorError> {
    let record = lookup(state, container_id)?;
    let conn = connected_conn(state, &record.node_id)?;
    send(&conn, Message::StopContainer { name: record.name }, &record.node_id).await
}

/// Send `DELETE_CONTAINER` and wait for the worker's `ACK` (or `ERROR`, or
/// [`ACK_TIMEOUT`]) before removing the record from the ledger — the one
/// operator command whose ledger effect per §4.6 is deferred to the reply.
pub async fn delete(state: &Arc<CoordinatorState>, container_id: &ContainerId) -> Result<(), CoordinatorError> {
    let record = lookup(state, container_id)?;
    let conn = connected_conn(state, &record.node_id)?;

    let rx = state.pending.register(container_id.clone());
    send(&conn, Message::DeleteContainer { name: record.name.clone() }, &record.node_id).await?;

    match tokio::time::timeout(ACK_TIMEOUT, rx).await {
        Ok(Ok(Ok(()))) => {
            state.ledger.remove(container_id).map_err(|_| CoordinatorError::NotFound(container_id.to_string()))?;
            let _ = state.registry.detach_container(&record.node_id, container_id);
            Ok(())
        }
        Ok(Ok(Err(reason))) => {
            let _ = state.ledger.update_state(container_id, ContainerState::Error);
            Err(CoordinatorError::Remote(reason))
        }
        Ok(Err(_recv_dropped)) | Err(_timed_out) => Err(CoordinatorError::Timeout),
    }
}

pub fn list_containers(state: &CoordinatorState) -> Vec<ContainerRecord> {
    state.ledger.list()
}

pub fn list_nodes(state: &CoordinatorState) -> Vec<fleet_engine::NodeRecord<Conn>> {
    state.registry.snapshot()
}

fn lookup(state: &CoordinatorState, container_id: &ContainerId) -> Result<ContainerRecord, CoordinatorError> {
    state.ledger.get(container_id).ok_or_else(|| CoordinatorError::NotFound(container_id.to_string()))
}

fn connected_conn(state: &CoordinatorState, node_id: &NodeId) -> Result<Arc<Conn>, CoordinatorError> {
    let record = state.registry.lookup(node_id).ok_or_else(|| CoordinatorError::WorkerUnavailable(node_id.clone()))?;
    if record.state != NodeState::Connected {
        return Err(CoordinatorError::WorkerUnavailable(node_id.clone()));
    }
    record
        .conn
        .as_ref()
        .and_then(Weak::upgrade)
        .ok_or_else(|| CoordinatorError::WorkerUnavailable(node_id.clone()))
}

async fn send(conn: &Conn, message: Message, recipient_id: &NodeId) -> Result<(), CoordinatorError> {
    let frame = message.into_frame(COORDINATOR_ID, recipient_id.as_str())?;
    let mut guard = conn.lock().await;
    write_frame(&mut *guard, &frame).await?;
    Ok(())
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}
