//! Resource samples reported by a worker in a `NODE_HEARTBEAT`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    /// Percentage, 0.0-100.0.
    pub cpu_used: f64,
    /// Percentage, 0.0-100.0.
    pub mem_used: f64,
    /// Percentage, 0.0-100.0.
    pub disk_used: f64,
    pub container_count: u32,
    pub max_containers: u32,
}

impl ResourceSample {
    pub const ZERO: ResourceSample = ResourceSample {
        cpu_used: 0.0,
        mem_used: 0.0,
        disk_used: 0.0,
        container_count: 0,
        max_containers: 0,
    };

    pub fn has_capacity(&self) -> bool {
        self.container_count < self.max_containers
    }
}

impl Default for ResourceSample {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
