//! Placement: pick the best live worker for a spec under a weighted score.
//!
//! Pure with respect to the snapshot it reads — takes a cloned `Vec` of
//! records under the registry lock and scores outside it, so the lock is
//! never held for the (trivial, but non-zero) cost of scoring many
//! candidates.
//!
//! Note (open question, carried from the source per spec §9): scoring
//! ignores the spec's own `cpu_limit`/`memory_limit` — a spec that needs
//! more than a worker has free may still be placed there.

use std::time::Instant;

use fleet_core::{ContainerSpec, NodeId};

use crate::error::Error;
use crate::registry::{NodeRecord, NodeRegistry};
use crate::HEARTBEAT_TIMEOUT;

/// Choose the best worker for `spec`, or [`Error::NoCapacity`] if none
/// qualifies. `_spec` is taken for API symmetry with a future
/// capacity-aware filter (see module docs); the current score ignores it.
pub fn pick_node<C>(registry: &NodeRegistry<C>, _spec: &ContainerSpec, now: Instant) -> Result<NodeId, Error> {
    let snapshot = registry.snapshot();
    best_candidate(&snapshot, now).ok_or(Error::NoCapacity)
}

fn best_candidate<C>(snapshot: &[NodeRecord<C>], now: Instant) -> Option<NodeId> {
    snapshot
        .iter()
        .filter(|node| is_eligible(node, now))
        .map(|node| (score(node), &node.id))
        .fold(None, |best: Option<(f64, &NodeId)>, candidate| match best {
            None => Some(candidate),
            Some(current) if candidate.0 > current.0 => Some(candidate),
            Some(current) if candidate.0 == current.0 && candidate.1 < current.1 => Some(candidate),
            Some(current) => Some(current),
        })
        .map(|(_, id)| id.clone())
}

fn is_eligible<C>(node: &NodeRecord<C>, now: Instant) -> bool {
    node.state == fleet_core::NodeState::Connected
        && now.saturating_duration_since(node.last_heartbeat) <= HEARTBEAT_TIMEOUT
        && node.container_count < node.resources.max_containers
}

fn score<C>(node: &NodeRecord<C>) -> f64 {
    let cpu_free = 100.0 - node.resources.cpu_used;
    let mem_free = 100.0 - node.resources.mem_used;
    let disk_free = 100.0 - node.resources.disk_used;
    let load_term = if node.resources.max_containers == 0 {
        0.0
    } else {
        (1.0 - node.container_count as f64 / node.resources.max_containers as f64) * 100.0
    };
    0.30 * cpu_free + 0.30 * mem_free + 0.20 * disk_free + 0.20 * load_term
}

#[cfg(test)]
#[path = "scorer_tests.rs"]
mod tests;
