//! Container records and their lifecycle state machine.

use serde::{Deserialize, Serialize};

use crate::ids::{ContainerId, NodeId};
use crate::spec::ContainerSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContainerState::Stopped => "STOPPED",
            ContainerState::Starting => "STARTING",
            ContainerState::Running => "RUNNING",
            ContainerState::Stopping => "STOPPING",
            ContainerState::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

impl ContainerState {
    /// Whether `next` is a legal transition from `self`, per the lifecycle
    /// DAG in §4.5: any state may transition to `Error`, and the
    /// Starting/Stopping pair resolve only to their paired outcomes.
    pub fn can_transition_to(self, next: ContainerState) -> bool {
        use ContainerState::*;
        if next == Error {
            return true;
        }
        matches!(
            (self, next),
            (Stopped, Starting) | (Starting, Running) | (Running, Stopping) | (Stopping, Stopped)
        )
    }

    /// Whether a container in this state may be removed by a `DELETE` ack.
    /// `Starting` and `Stopping` are terminal until the worker reports back.
    pub fn deletable(self) -> bool {
        !matches!(self, ContainerState::Starting | ContainerState::Stopping)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: ContainerId,
    pub name: String,
    pub node_id: NodeId,
    pub state: ContainerState,
    pub spec: ContainerSpec,
    /// Epoch milliseconds.
    pub created_at: u64,
    /// Epoch milliseconds; `None` until the worker reports `Running`.
    pub started_at: Option<u64>,
}

impl ContainerRecord {
    pub fn new(node_id: NodeId, spec: ContainerSpec, created_at: u64) -> Self {
        let id = ContainerId::new(&node_id, &spec.name);
        Self {
            id,
            name: spec.name.clone(),
            node_id,
            state: ContainerState::Starting,
            spec,
            created_at,
            started_at: None,
        }
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
