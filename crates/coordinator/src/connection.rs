//! Per-connection task (§4.6): one spawned per accepted socket. Reads
//! frames in a loop and dispatches by type; never holds the registry or
//! ledger lock across the read.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::Mutex as AsyncMutex;

use fleet_core::NodeId;
use fleet_wire::{read_frame, write_frame, Frame, Message};

use crate::state::{Conn, CoordinatorState, COORDINATOR_ID};

#[derive(Debug, Error)]
enum ConnectionError {
    #[error(transparent)]
    Transport(#[from] fleet_wire::TransportError),
    #[error("connection did not begin with REGISTER_NODE")]
    ExpectedRegister,
    #[error(transparent)]
    Registry(#[from] fleet_engine::Error),
}

/// Accept-loop entry point: register the worker, then service its frames
/// until the connection closes or a short read occurs.
pub async fn handle(stream: TcpStream, state: Arc<CoordinatorState>) {
    let (mut reader, writer) = stream.into_split();
    let conn: Arc<Conn> = Arc::new(AsyncMutex::new(writer));

    let node_id = match register(&mut reader, &conn, &state).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "connection closed before registration completed");
            return;
        }
    };

    loop {
        match read_frame(&mut reader).await {
            Ok(frame) => {
                if let Err(e) = dispatch(&frame, &node_id, &state) {
                    tracing::debug!(%node_id, error = %e, "dropped malformed frame");
                }
            }
            Err(e) => {
                tracing::info!(%node_id, error = %e, "worker connection closed");
                break;
            }
        }
    }

    let _ = state.registry.mark_disconnected(&node_id);
    let affected = state.ledger.mark_node_errored(&node_id);
    if !affected.is_empty() {
        tracing::info!(%node_id, count = affected.len(), "orphaned containers marked ERROR");
    }
}

/// Read the mandatory first frame and register the worker. Per §4.1 the
/// wire carries the worker's chosen id as the frame's `sender_id`.
async fn register(reader: &mut OwnedReadHalf, conn: &Arc<Conn>, state: &CoordinatorState) -> Result<NodeId, ConnectionError> {
    let frame = read_frame(reader).await?;
    let message = Message::from_frame(&frame)?;
    let Message::RegisterNode { hostname, ip, port } = message else {
        return Err(ConnectionError::ExpectedRegister);
    };

    let node_id = NodeId::new(frame.sender_id.clone());
    state.registry.register(node_id.clone(), hostname, ip, port, conn, Instant::now())?;

    let ack = Message::Ack("registered".to_string()).into_frame(COORDINATOR_ID, node_id.as_str())?;
    let mut guard = conn.lock().await;
    write_frame(&mut *guard, &ack).await?;
    drop(guard);

    tracing::info!(%node_id, "worker registered");
    Ok(node_id)
}

fn dispatch(frame: &Frame, node_id: &NodeId, state: &CoordinatorState) -> Result<(), ConnectionError> {
    let message = Message::from_frame(frame)?;
    match message {
        Message::NodeHeartbeat(sample) => {
            state.registry.touch(node_id, sample, Instant::now())?;
        }
        Message::ContainerStatus(status) => {
            if let Err(e) = state.ledger.update_state(&status.id, status.state) {
                tracing::debug!(%node_id, error = %e, "dropped container status update");
            }
        }
        Message::Ack(text) => resolve_pending(state, node_id, &text, Ok(())),
        Message::Error(text) => {
            tracing::warn!(%node_id, message = %text, "worker reported error");
            resolve_pending(state, node_id, &text, Err(text.clone()));
        }
        Message::Unknown(b) => {
            tracing::warn!(%node_id, discriminant = b, "ignoring unknown message type");
        }
        other => {
            tracing::warn!(%node_id, ?other, "unexpected message type from worker");
        }
    }
    Ok(())
}

/// `ACK`/`ERROR` bodies carry no structured id (§4.1: "human-readable
/// text"); by convention the worker leads with the container name, which
/// we use to correlate against any pending operator command (only
/// `delete` currently registers one).
fn resolve_pending(state: &CoordinatorState, node_id: &NodeId, text: &str, outcome: Result<(), String>) {
    let Some(name) = text.split_whitespace().next() else { return };
    let container_id = fleet_core::ContainerId::new(node_id, name);
    state.pending.resolve(&container_id, outcome);
}
