//! Authoritative in-memory set of known workers, their liveness, and their
//! resources.
//!
//! A single `parking_lot::Mutex` guards the table; every public method's
//! critical section is O(1) and touches no I/O, so the lock is never held
//! across a suspension point (§5).

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;

use fleet_core::{ContainerId, NodeId, NodeState, ResourceSample};

use crate::error::Error;

/// Matches the original `MAX_NODES`.
pub const MAX_NODES: usize = 256;

/// The coordinator's view of one worker.
///
/// `conn` is a weak back-reference to the connection task's write handle —
/// the accepting task owns the handle for the connection's lifetime; the
/// registry never extends it. `container_count` is the ledger-derived,
/// authoritative count used for placement (distinct from
/// `resources.container_count`, which is the worker's own self-reported
/// figure from its last heartbeat).
pub struct NodeRecord<C> {
    pub id: NodeId,
    pub hostname: String,
    pub ip: String,
    pub port: u16,
    pub state: NodeState,
    pub resources: ResourceSample,
    pub container_count: u32,
    pub last_heartbeat: Instant,
    pub conn: Option<Weak<C>>,
    pub containers: Vec<ContainerId>,
}

impl<C> Clone for NodeRecord<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            hostname: self.hostname.clone(),
            ip: self.ip.clone(),
            port: self.port,
            state: self.state,
            resources: self.resources,
            container_count: self.container_count,
            last_heartbeat: self.last_heartbeat,
            conn: self.conn.clone(),
            containers: self.containers.clone(),
        }
    }
}

pub struct NodeRegistry<C> {
    table: Mutex<HashMap<NodeId, NodeRecord<C>>>,
}

impl<C> Default for NodeRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> NodeRegistry<C> {
    pub fn new() -> Self {
        Self { table: Mutex::new(HashMap::new()) }
    }

    /// Insert a new record, or update an existing one's connection details
    /// and force it back to `Connected`. Rejects with
    /// [`Error::CapacityExceeded`] when the table is full and `id` is new.
    pub fn register(
        &self,
        id: NodeId,
        hostname: String,
        ip: String,
        port: u16,
        conn: &Arc<C>,
        now: Instant,
    ) -> Result<(), Error> {
        let mut table = self.table.lock();
        if let Some(existing) = table.get_mut(&id) {
            existing.hostname = hostname;
            existing.ip = ip;
            existing.port = port;
            existing.state = NodeState::Connected;
            existing.last_heartbeat = now;
            existing.conn = Some(Arc::downgrade(conn));
            tracing::debug!(%id, "node re-registered");
            return Ok(());
        }

        if table.len() >= MAX_NODES {
            tracing::warn!(%id, "registry at capacity, rejecting registration");
            return Err(Error::CapacityExceeded);
        }

        table.insert(
            id.clone(),
            NodeRecord {
                id: id.clone(),
                hostname,
                ip,
                port,
                state: NodeState::Connected,
                resources: ResourceSample::ZERO,
                container_count: 0,
                last_heartbeat: now,
                conn: Some(Arc::downgrade(conn)),
                containers: Vec::new(),
            },
        );
        tracing::debug!(%id, "node registered");
        Ok(())
    }

    /// Refresh `last_heartbeat` and replace `resources`. Forces
    /// `state = Connected` unless the node is sticky `Error` — an operator
    /// must clear that state explicitly (by removing and re-registering).
    pub fn touch(&self, id: &NodeId, resources: ResourceSample, now: Instant) -> Result<(), Error> {
        let mut table = self.table.lock();
        let record = table.get_mut(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        record.last_heartbeat = now;
        record.resources = resources;
        if record.state != NodeState::Error {
            record.state = NodeState::Connected;
        }
        Ok(())
    }

    pub fn lookup(&self, id: &NodeId) -> Option<NodeRecord<C>> {
        self.table.lock().get(id).cloned()
    }

    /// Detach the connection and mark the node disconnected. Containers
    /// already on the node are left untouched here — the caller is
    /// responsible for cascading to the ledger.
    pub fn mark_disconnected(&self, id: &NodeId) -> Result<(), Error> {
        let mut table = self.table.lock();
        let record = table.get_mut(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        record.state = NodeState::Disconnected;
        record.conn = None;
        tracing::info!(%id, "node marked disconnected");
        Ok(())
    }

    pub fn mark_error(&self, id: &NodeId) -> Result<(), Error> {
        let mut table = self.table.lock();
        let record = table.get_mut(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        record.state = NodeState::Error;
        record.conn = None;
        Ok(())
    }

    /// Evict a node entirely. Returns the container ids that were placed on
    /// it so the caller can cascade the removal into the ledger (marking
    /// them `Error`, per §3's invariant that removing a worker never
    /// removes its containers).
    pub fn remove(&self, id: &NodeId) -> Result<Vec<ContainerId>, Error> {
        let mut table = self.table.lock();
        let record = table.remove(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        Ok(record.containers)
    }

    pub fn attach_container(&self, id: &NodeId, container_id: ContainerId) -> Result<(), Error> {
        let mut table = self.table.lock();
        let record = table.get_mut(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        record.containers.push(container_id);
        record.container_count = record.containers.len() as u32;
        Ok(())
    }

    pub fn detach_container(&self, id: &NodeId, container_id: &ContainerId) -> Result<(), Error> {
        let mut table = self.table.lock();
        let record = table.get_mut(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        record.containers.retain(|c| c != container_id);
        record.container_count = record.containers.len() as u32;
        Ok(())
    }

    /// A `Weak` back-reference to the live connection handle, if any.
    pub fn conn(&self, id: &NodeId) -> Option<Weak<C>> {
        self.table.lock().get(id).and_then(|r| r.conn.clone())
    }

    /// Snapshot of every record, for the placement scorer and `list nodes`.
    pub fn snapshot(&self) -> Vec<NodeRecord<C>> {
        self.table.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
