//! Declarative intent for one container, deployed by the operator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum byte length of a container name, matching the original C
/// implementation's `MAX_NAME_LEN` bound on runtime identifiers.
pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: Option<String>,
    pub cpu_limit: u32,
    pub memory_limit: u32,
    pub privileged: bool,
    pub env: Vec<(String, String)>,
    pub mounts: Vec<String>,
    pub network: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("container name must not be empty")]
    EmptyName,
    #[error("container name exceeds {MAX_NAME_LEN} bytes")]
    NameTooLong,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>) -> Result<Self, SpecError> {
        let spec = Self {
            name: name.into(),
            image: None,
            cpu_limit: 0,
            memory_limit: 0,
            privileged: false,
            env: Vec::new(),
            mounts: Vec::new(),
            network: None,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        if self.name.is_empty() {
            return Err(SpecError::EmptyName);
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(SpecError::NameTooLong);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
