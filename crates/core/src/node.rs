//! Coordinator-side view of a worker.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Connecting,
    Connected,
    Busy,
    Disconnected,
    Error,
}

impl NodeState {
    /// Whether a worker in this state may still receive lifecycle commands.
    pub fn is_live(self) -> bool {
        matches!(self, NodeState::Connected | NodeState::Busy)
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeState::Connecting => "CONNECTING",
            NodeState::Connected => "CONNECTED",
            NodeState::Busy => "BUSY",
            NodeState::Disconnected => "DISCONNECTED",
            NodeState::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
