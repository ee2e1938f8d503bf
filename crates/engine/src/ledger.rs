//! Authoritative record of deployed containers and their lifecycle states.
//!
//! A `parking_lot::Mutex` guards both the primary map and the secondary
//! `node_id -> {container_id}` index together, so they're always updated
//! as one transaction. Illegal transitions (per
//! `ContainerState::can_transition_to`) are rejected and logged rather than
//! applied — the one place that rule is enforced, instead of scattered
//! match arms at every call site.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use fleet_core::{ContainerId, ContainerRecord, ContainerState, NodeId};

use crate::error::Error;

#[derive(Default)]
struct Inner {
    containers: HashMap<ContainerId, ContainerRecord>,
    by_node: HashMap<NodeId, HashSet<ContainerId>>,
}

#[derive(Default)]
pub struct ContainerLedger {
    inner: Mutex<Inner>,
}

impl ContainerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly deployed container record. A second deploy of the
    /// same `(node, name)` overwrites the first, matching `ContainerId`'s
    /// documented collision policy.
    pub fn insert(&self, record: ContainerRecord) {
        let mut inner = self.inner.lock();
        inner.by_node.entry(record.node_id.clone()).or_default().insert(record.id.clone());
        inner.containers.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &ContainerId) -> Option<ContainerRecord> {
        self.inner.lock().containers.get(id).cloned()
    }

    /// Apply a state transition if legal; otherwise returns
    /// [`Error::IllegalTransition`] and leaves the ledger unchanged.
    pub fn update_state(&self, id: &ContainerId, new_state: ContainerState) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let record = inner.containers.get_mut(id).ok_or_else(|| Error::ContainerNotFound(id.clone()))?;
        if !record.state.can_transition_to(new_state) {
            tracing::warn!(%id, from = %record.state, to = %new_state, "dropped illegal container transition");
            return Err(Error::IllegalTransition { id: id.clone(), from: record.state, to: new_state });
        }
        if new_state == ContainerState::Running && record.started_at.is_none() {
            record.started_at = Some(now_ms());
        }
        record.state = new_state;
        Ok(())
    }

    /// Force every container on `node_id` to `Error`, regardless of their
    /// current state — used on worker disconnect, which is allowed from
    /// any state per the transition table.
    pub fn mark_node_errored(&self, node_id: &NodeId) -> Vec<ContainerId> {
        let mut inner = self.inner.lock();
        let ids: Vec<ContainerId> = inner.by_node.get(node_id).cloned().unwrap_or_default().into_iter().collect();
        for id in &ids {
            if let Some(record) = inner.containers.get_mut(id) {
                record.state = ContainerState::Error;
            }
        }
        ids
    }

    /// Remove a container following a `DELETE` ack. Fails with
    /// [`Error::IllegalTransition`] if the container is `Starting` or
    /// `Stopping` — those states are terminal until the worker reports back.
    pub fn remove(&self, id: &ContainerId) -> Result<ContainerRecord, Error> {
        let mut inner = self.inner.lock();
        let record = inner.containers.get(id).ok_or_else(|| Error::ContainerNotFound(id.clone()))?;
        if !record.state.deletable() {
            return Err(Error::IllegalTransition { id: id.clone(), from: record.state, to: record.state });
        }
        let record = match inner.containers.remove(id) {
            Some(record) => record,
            None => return Err(Error::ContainerNotFound(id.clone())),
        };
        if let Some(set) = inner.by_node.get_mut(&record.node_id) {
            set.remove(id);
        }
        Ok(record)
    }

    pub fn list(&self) -> Vec<ContainerRecord> {
        self.inner.lock().containers.values().cloned().collect()
    }

    pub fn list_by_node(&self, node_id: &NodeId) -> Vec<ContainerRecord> {
        let inner = self.inner.lock();
        inner
            .by_node
            .get(node_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.containers.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
