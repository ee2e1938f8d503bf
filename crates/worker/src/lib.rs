//! fleet-worker: the worker agent (§4.7). Maintains the single long-lived
//! connection to the coordinator, registers, heartbeats, and services
//! lifecycle commands against a local [`fleet_engine::ContainerLedger`] and
//! a [`fleet_adapters::RuntimeDriver`].

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod agent;
pub mod commands;
pub mod connection;
pub mod error;
pub mod heartbeat;
pub mod state;

pub use agent::WorkerAgent;
pub use error::WorkerError;
