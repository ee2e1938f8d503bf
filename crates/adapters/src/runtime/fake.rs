//! An in-memory [`RuntimeDriver`] that records every call it receives and
//! answers from scripted, settable state, for use by `fleet-engine`,
//! `fleet-coordinator` and `fleet-worker` tests.

use std::collections::HashMap;

use async_trait::async_trait;
use fleet_core::{ContainerSpec, ContainerState, ResourceSample};
use parking_lot::Mutex;

use super::{RuntimeDriver, RuntimeError};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    Create(String),
    Start(String),
    Stop(String),
    Destroy(String),
}

#[derive(Default)]
struct Inner {
    calls: Vec<RecordedCommand>,
    states: HashMap<String, ContainerState>,
    resources: ResourceSample,
    /// Names whose next call should return this error instead of succeeding.
    fail_next: HashMap<String, RuntimeError>,
}

pub struct FakeRuntimeDriver {
    inner: Mutex<Inner>,
}

impl FakeRuntimeDriver {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.inner.lock().calls.clone()
    }

    pub fn set_state(&self, name: &str, state: ContainerState) {
        self.inner.lock().states.insert(name.to_string(), state);
    }

    pub fn set_resources(&self, sample: ResourceSample) {
        self.inner.lock().resources = sample;
    }

    /// Arrange for the next call naming `name` to fail with `err`, then be
    /// cleared — used to simulate a single transient runtime failure.
    pub fn fail_next_call(&self, name: &str, err: RuntimeError) {
        self.inner.lock().fail_next.insert(name.to_string(), err);
    }

    fn maybe_fail(&self, name: &str) -> Option<RuntimeError> {
        self.inner.lock().fail_next.remove(name)
    }
}

impl Default for FakeRuntimeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeDriver for FakeRuntimeDriver {
    async fn create(&self, spec: &ContainerSpec) -> Result<(), RuntimeError> {
        if let Some(err) = self.maybe_fail(&spec.name) {
            return Err(err);
        }
        let mut inner = self.inner.lock();
        inner.calls.push(RecordedCommand::Create(spec.name.clone()));
        inner.states.entry(spec.name.clone()).or_insert(ContainerState::Stopped);
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), RuntimeError> {
        if let Some(err) = self.maybe_fail(name) {
            return Err(err);
        }
        let mut inner = self.inner.lock();
        inner.calls.push(RecordedCommand::Start(name.to_string()));
        inner.states.insert(name.to_string(), ContainerState::Running);
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        if let Some(err) = self.maybe_fail(name) {
            return Err(err);
        }
        let mut inner = self.inner.lock();
        inner.calls.push(RecordedCommand::Stop(name.to_string()));
        inner.states.insert(name.to_string(), ContainerState::Stopped);
        Ok(())
    }

    async fn destroy(&self, name: &str) -> Result<(), RuntimeError> {
        if let Some(err) = self.maybe_fail(name) {
            return Err(err);
        }
        let mut inner = self.inner.lock();
        // Idempotent: absent name is a no-op, not a failure.
        inner.calls.push(RecordedCommand::Destroy(name.to_string()));
        inner.states.remove(name);
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, RuntimeError> {
        Ok(self.inner.lock().states.contains_key(name))
    }

    async fn query_state(&self, name: &str) -> Result<ContainerState, RuntimeError> {
        Ok(self.inner.lock().states.get(name).copied().unwrap_or(ContainerState::Error))
    }

    async fn sample_resources(&self) -> Result<ResourceSample, RuntimeError> {
        Ok(self.inner.lock().resources)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
