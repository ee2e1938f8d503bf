use fleet_core::{ContainerId, ContainerState, NodeId};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum Error {
    #[error("node registry is at capacity")]
    CapacityExceeded,

    #[error("unknown node: {0}")]
    NodeNotFound(NodeId),

    #[error("unknown container: {0}")]
    ContainerNotFound(ContainerId),

    #[error("illegal transition for {id}: {from:?} -> {to:?}")]
    IllegalTransition { id: ContainerId, from: ContainerState, to: ContainerState },

    #[error("no live worker satisfies placement")]
    NoCapacity,
}
