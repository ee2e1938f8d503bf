//! The adapter contract the core depends on for running containers.

mod shell;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use shell::ShellRuntimeDriver;

use async_trait::async_trait;
use fleet_core::{ContainerSpec, ContainerState, ResourceSample};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime command for '{name}' exited with status {status}: {stderr}")]
    CommandFailed { name: String, status: i32, stderr: String },

    #[error("failed to invoke runtime CLI: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("runtime reported unparseable output for '{name}': {output}")]
    UnparseableOutput { name: String, output: String },
}

/// Adapter over the local container runtime.
///
/// Policy (matches spec §4.8): `create` is idempotent — deploying to a name
/// that already exists is `Ok`. `destroy` is idempotent — deleting an
/// absent container is `Ok`. `stop` then `destroy` is the cleanup order.
/// Output this adapter cannot parse maps to [`ContainerState::Error`], never
/// a decode failure.
#[async_trait]
pub trait RuntimeDriver: Send + Sync {
    async fn create(&self, spec: &ContainerSpec) -> Result<(), RuntimeError>;
    async fn start(&self, name: &str) -> Result<(), RuntimeError>;
    async fn stop(&self, name: &str) -> Result<(), RuntimeError>;
    async fn destroy(&self, name: &str) -> Result<(), RuntimeError>;
    async fn exists(&self, name: &str) -> Result<bool, RuntimeError>;
    async fn query_state(&self, name: &str) -> Result<ContainerState, RuntimeError>;
    async fn sample_resources(&self) -> Result<ResourceSample, RuntimeError>;
}
