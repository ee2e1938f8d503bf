//! The worker agent (§4.7): connects to the coordinator, registers, then
//! runs the heartbeat task and the receive loop side by side until either
//! one ends the connection.

use std::sync::Arc;

use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;

use fleet_adapters::RuntimeDriver;
use fleet_core::NodeId;
use fleet_wire::{read_frame, write_frame, Message};

use crate::connection;
use crate::error::WorkerError;
use crate::heartbeat;
use crate::state::{Conn, WorkerState, COORDINATOR_ID};

pub struct WorkerAgent {
    state: Arc<WorkerState>,
    runtime: Arc<dyn RuntimeDriver>,
    reader: OwnedReadHalf,
}

impl WorkerAgent {
    /// Connect to the coordinator, derive this node's id, send
    /// `REGISTER_NODE`, and wait for its `ACK` (§4.7 steps 1-3). On any
    /// failure the caller should abort — there is no retry in this version.
    pub async fn connect(coordinator_ip: &str, coordinator_port: u16, runtime: Arc<dyn RuntimeDriver>) -> Result<Self, WorkerError> {
        let stream = TcpStream::connect((coordinator_ip, coordinator_port)).await?;
        let local_ip = stream.local_addr().map(|addr| addr.ip().to_string()).unwrap_or_else(|_| "0.0.0.0".to_string());
        let (mut reader, writer) = stream.into_split();
        let conn: Arc<Conn> = Arc::new(AsyncMutex::new(writer));

        let node_id = derive_node_id();
        let hostname = hostname_string();

        register(&mut reader, &conn, &node_id, hostname, local_ip).await?;

        let state = Arc::new(WorkerState::new(node_id, Arc::clone(&runtime), conn));
        Ok(Self { state, runtime, reader })
    }

    /// Launch the heartbeat task (every 10 s) and the receive loop, and run
    /// until either ends — a send/receive error on one side ends the
    /// worker's connection, per §4.7.
    pub async fn run(self) {
        let WorkerAgent { state, runtime, reader } = self;
        tracing::info!(node_id = %state.node_id, "worker node is ready and waiting for tasks");
        tokio::select! {
            _ = heartbeat::run(Arc::clone(&state), runtime) => {}
            _ = connection::run(reader, Arc::clone(&state)) => {}
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.state.node_id
    }
}

async fn register(
    reader: &mut OwnedReadHalf,
    conn: &Arc<Conn>,
    node_id: &NodeId,
    hostname: String,
    ip: String,
) -> Result<(), WorkerError> {
    let message = Message::RegisterNode { hostname, ip, port: 0 };
    let frame = message.into_frame(node_id.as_str(), COORDINATOR_ID)?;
    {
        let mut guard = conn.lock().await;
        write_frame(&mut *guard, &frame).await?;
    }

    let ack_frame = read_frame(reader).await.map_err(|_| WorkerError::RegistrationClosed)?;
    match Message::from_frame(&ack_frame)? {
        Message::Ack(_) => {
            tracing::info!(%node_id, "successfully registered with coordinator");
            Ok(())
        }
        _ => Err(WorkerError::RegistrationRejected),
    }
}

/// `{hostname}_{pid}` (§4.7 step 2), matching
/// `examples/original_source/src/worker.c: generate_node_id`.
fn derive_node_id() -> NodeId {
    NodeId::new(format!("{}_{}", hostname_string(), std::process::id()))
}

fn hostname_string() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}
