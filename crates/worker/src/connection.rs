//! The worker's receive loop (§4.7): reads frames from the coordinator and
//! dispatches lifecycle commands. Each command is handed to its own spawned
//! task (`fleet_worker::commands`) so the loop never blocks on a
//! [`fleet_adapters::RuntimeDriver`] call for longer than it takes to spawn
//! it (§5).

use std::sync::Arc;

use tokio::net::tcp::OwnedReadHalf;

use fleet_wire::{read_frame, Message};

use crate::commands;
use crate::state::WorkerState;

/// Service frames until the connection closes, a short read occurs, or an
/// unrecognized message type arrives (§6: unknown types close the worker
/// connection, unlike the coordinator side, which logs and ignores them).
pub async fn run(mut reader: OwnedReadHalf, state: Arc<WorkerState>) {
    loop {
        match read_frame(&mut reader).await {
            Ok(frame) => match Message::from_frame(&frame) {
                Ok(Message::Unknown(b)) => {
                    tracing::warn!(discriminant = b, "unknown message type from coordinator, closing connection");
                    break;
                }
                Ok(message) => dispatch(&state, message),
                Err(e) => {
                    tracing::warn!(error = %e, "malformed frame from coordinator, closing connection");
                    break;
                }
            },
            Err(e) => {
                tracing::info!(error = %e, "connection to coordinator lost");
                break;
            }
        }
    }
}

fn dispatch(state: &Arc<WorkerState>, message: Message) {
    match message {
        Message::DeployContainer(spec) => {
            let state = Arc::clone(state);
            tokio::spawn(async move { commands::deploy(&state, spec).await });
        }
        Message::StartContainer { name } => {
            let state = Arc::clone(state);
            tokio::spawn(async move { commands::start(&state, name).await });
        }
        Message::StopContainer { name } => {
            let state = Arc::clone(state);
            tokio::spawn(async move { commands::stop(&state, name).await });
        }
        Message::DeleteContainer { name } => {
            let state = Arc::clone(state);
            tokio::spawn(async move { commands::delete(&state, name).await });
        }
        other => {
            tracing::debug!(?other, "ignoring message not expected from the coordinator");
        }
    }
}
