//! Operator-facing error kinds (§7). The REPL renders these as a single
//! line; they never crash a connection or the process.

use thiserror::Error;

use fleet_core::NodeId;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("config parse error: {0}")]
    Parse(#[from] fleet_adapters::ConfigError),
    #[error("no worker satisfies placement")]
    NoCapacity,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("worker {0} is not connected")]
    WorkerUnavailable(NodeId),
    #[error("command timed out waiting for worker acknowledgment")]
    Timeout,
    #[error("worker reported: {0}")]
    Remote(String),
    #[error(transparent)]
    Transport(#[from] fleet_wire::TransportError),
}
