//! fleet-engine: the coordinator's in-memory control plane — node registry,
//! liveness reaper, placement scorer, and container ledger. Nothing here
//! touches a socket; `fleet-coordinator` wires these primitives to the
//! wire protocol and the operator REPL.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
pub mod ledger;
pub mod reaper;
pub mod registry;
pub mod scorer;

use std::time::Duration;

pub use error::Error;
pub use ledger::ContainerLedger;
pub use reaper::Reaper;
pub use registry::{NodeRecord, NodeRegistry, MAX_NODES};
pub use scorer::pick_node;

/// A `CONNECTED` worker that hasn't heartbeat within this window is stale:
/// the scorer skips it and the reaper marks it `DISCONNECTED` (§4.3, §4.4).
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(30);

/// How often the liveness reaper sweeps the registry (§4.3).
pub const REAPER_INTERVAL: Duration = Duration::from_secs(5);
