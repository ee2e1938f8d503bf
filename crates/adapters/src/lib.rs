//! fleet-adapters: the two external collaborators the core depends on —
//! a [`RuntimeDriver`] for the host container runtime and a [`ConfigLoader`]
//! for the declarative deploy-file format.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader};
pub use runtime::{RuntimeDriver, RuntimeError, ShellRuntimeDriver};

#[cfg(feature = "test-support")]
pub use runtime::fake::{FakeRuntimeDriver, RecordedCommand};
