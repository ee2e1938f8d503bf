//! Workspace-level integration suite exercising the S1-S6 scenarios end to
//! end over real loopback TCP, with `FakeRuntimeDriver` standing in for the
//! container runtime on the worker side.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex as AsyncMutex;

use fleet_adapters::{FakeRuntimeDriver, RecordedCommand};
use fleet_coordinator::state::{Conn, CoordinatorState};
use fleet_coordinator::{commands as coord, CoordinatorError};
use fleet_core::{ContainerId, ContainerRecord, ContainerSpec, ContainerState, NodeId, NodeState, ResourceSample};
use fleet_worker::WorkerAgent;

async fn start_coordinator() -> (Arc<CoordinatorState>, SocketAddr) {
    let state = Arc::new(CoordinatorState::new());
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind coordinator listener");
    let addr = listener.local_addr().expect("listener addr");

    let accept_state = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let state = Arc::clone(&accept_state);
                    tokio::spawn(async move { fleet_coordinator::connection::handle(stream, state).await });
                }
                Err(_) => break,
            }
        }
    });

    (state, addr)
}

async fn loopback_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener addr");
    let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
    let client = client.expect("connect loopback client");
    let (server, _) = accepted.expect("accept loopback server");
    (client, server)
}

/// A worker registered directly against the registry, bypassing
/// `fleet-worker`, for tests that need a deterministic `NodeId` (the real
/// agent derives its id from hostname+pid). Holds the backing socket pair
/// open for the test's duration; the registry's back-reference is only a
/// weak pointer into `conn`.
struct RawWorker {
    #[allow(dead_code)]
    conn: Arc<Conn>,
    _peer: TcpStream,
    _client_reader: OwnedReadHalf,
}

async fn register_raw_worker(state: &CoordinatorState, id: &str, sample: ResourceSample) -> RawWorker {
    let (client, peer) = loopback_pair().await;
    let (client_reader, client_writer) = client.into_split();
    let conn: Arc<Conn> = Arc::new(AsyncMutex::new(client_writer));

    state
        .registry
        .register(NodeId::new(id), "host".to_string(), "127.0.0.1".to_string(), 9000, &conn, Instant::now())
        .expect("register raw worker");
    state.registry.touch(&NodeId::new(id), sample, Instant::now()).expect("touch raw worker");

    RawWorker { conn, _peer: peer, _client_reader: client_reader }
}

async fn eventually<T>(mut check: impl FnMut() -> Option<T>, timeout: Duration) -> T {
    let start = Instant::now();
    loop {
        if let Some(value) = check() {
            return value;
        }
        if start.elapsed() > timeout {
            panic!("condition was not met within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

async fn wait_for_registration(state: &CoordinatorState, node_id: &NodeId) {
    eventually(|| state.registry.lookup(node_id), Duration::from_secs(2)).await;
}

async fn wait_for_container_state(
    state: &CoordinatorState,
    id: &ContainerId,
    expected: ContainerState,
) -> ContainerRecord {
    eventually(|| state.ledger.get(id).filter(|record| record.state == expected), Duration::from_secs(2)).await
}

async fn wait_for_node_state(state: &CoordinatorState, id: &NodeId, expected: NodeState) {
    eventually(|| state.registry.lookup(id).filter(|record| record.state == expected).map(|_| ()), Duration::from_secs(2))
        .await;
}

fn sample(cpu: f64, mem: f64, disk: f64, count: u32, max: u32) -> ResourceSample {
    ResourceSample { cpu_used: cpu, mem_used: mem, disk_used: disk, container_count: count, max_containers: max }
}

/// S1 - basic deploy: one worker connects, the operator deploys a spec, and
/// the container reaches `RUNNING` once the worker's own `CONTAINER_STATUS`
/// arrives, with the worker's `container_count` updated to 1.
#[tokio::test]
async fn s1_basic_deploy_reaches_running() {
    let (state, addr) = start_coordinator().await;
    let runtime = Arc::new(FakeRuntimeDriver::new());
    runtime.set_resources(sample(10.0, 10.0, 10.0, 0, 50));

    let agent = WorkerAgent::connect("127.0.0.1", addr.port(), runtime).await.expect("agent connect");
    let node_id = agent.node_id().clone();
    tokio::spawn(agent.run());

    wait_for_registration(&state, &node_id).await;
    state.registry.touch(&node_id, sample(10.0, 10.0, 10.0, 0, 50), Instant::now()).expect("touch");

    let spec = ContainerSpec::new("web").expect("spec");
    let container_id = coord::deploy(&state, spec).await.expect("deploy");

    let record = wait_for_container_state(&state, &container_id, ContainerState::Running).await;
    assert_eq!(record.node_id, node_id);
    assert_eq!(record.name, "web");

    let node_record = state.registry.lookup(&node_id).expect("node record");
    assert_eq!(node_record.container_count, 1);
}

/// S2 - placement tie-break: two workers with identical resources; the
/// lexicographically smaller id wins.
#[tokio::test]
async fn s2_tie_break_prefers_lexicographically_smaller_id() {
    let (state, _addr) = start_coordinator().await;
    let identical = sample(10.0, 10.0, 10.0, 0, 50);
    let _w2 = register_raw_worker(&state, "w2", identical).await;
    let _w1 = register_raw_worker(&state, "w1", identical).await;

    let spec = ContainerSpec::new("web").expect("spec");
    let container_id = coord::deploy(&state, spec).await.expect("deploy");

    let record = state.ledger.get(&container_id).expect("record");
    assert_eq!(record.node_id, NodeId::new("w1"));
}

/// S3 - worker death during STARTING: the worker's socket closes before any
/// `CONTAINER_STATUS` arrives. The coordinator's connection task detects the
/// close directly (§4.6 point 6) rather than waiting on the 5 s reaper tick;
/// either path leaves the same end state, which is what this asserts.
#[tokio::test]
async fn s3_worker_disconnect_before_status_marks_container_error() {
    let (state, addr) = start_coordinator().await;
    let runtime = Arc::new(FakeRuntimeDriver::new());
    runtime.set_resources(sample(10.0, 10.0, 10.0, 0, 50));

    let agent = WorkerAgent::connect("127.0.0.1", addr.port(), runtime).await.expect("agent connect");
    let node_id = agent.node_id().clone();

    wait_for_registration(&state, &node_id).await;
    state.registry.touch(&node_id, sample(10.0, 10.0, 10.0, 0, 50), Instant::now()).expect("touch");

    let spec = ContainerSpec::new("web").expect("spec");
    let container_id = coord::deploy(&state, spec).await.expect("deploy");
    assert_eq!(state.ledger.get(&container_id).expect("record").state, ContainerState::Starting);

    // The agent's receive loop was never spawned, so DEPLOY_CONTAINER sits
    // unread; dropping it now closes the socket out from under the worker.
    drop(agent);

    wait_for_node_state(&state, &node_id, NodeState::Disconnected).await;
    let record = wait_for_container_state(&state, &container_id, ContainerState::Error).await;
    assert_eq!(record.id, container_id);
}

/// S4 - placement saturation: a worker at `container_count == max_containers`
/// is excluded; deploy fails without any ledger mutation.
#[tokio::test]
async fn s4_placement_saturation_rejects_without_ledger_mutation() {
    let (state, _addr) = start_coordinator().await;
    let _w1 = register_raw_worker(&state, "w1", sample(10.0, 10.0, 10.0, 2, 2)).await;
    state.registry.attach_container(&NodeId::new("w1"), ContainerId::new(&NodeId::new("w1"), "a")).expect("attach");
    state.registry.attach_container(&NodeId::new("w1"), ContainerId::new(&NodeId::new("w1"), "b")).expect("attach");

    let spec = ContainerSpec::new("web").expect("spec");
    let err = coord::deploy(&state, spec).await.expect_err("should have no capacity");
    assert!(matches!(err, CoordinatorError::NoCapacity));
    assert_eq!(state.ledger.len(), 0);
}

/// S5 - delete idempotence on the worker side: a second `DELETE_CONTAINER`
/// dispatch for a name the worker has already removed never reaches the
/// `RuntimeDriver` a second time.
#[tokio::test]
async fn s5_worker_delete_is_idempotent_and_calls_runtime_once() {
    let (client, _peer) = loopback_pair().await;
    let (_client_reader, client_writer) = client.into_split();
    let conn: Arc<Conn> = Arc::new(AsyncMutex::new(client_writer));
    let runtime = Arc::new(FakeRuntimeDriver::new());
    let node_id = NodeId::new("w1");
    let state = Arc::new(fleet_worker::state::WorkerState::new(node_id.clone(), runtime.clone(), conn));

    let spec = ContainerSpec::new("web").expect("spec");
    let record = ContainerRecord::new(node_id, spec, 1_000);
    let container_id = record.id.clone();
    state.ledger.insert(record);

    fleet_worker::commands::delete(&state, "web".to_string()).await;
    assert_eq!(runtime.calls(), vec![RecordedCommand::Destroy("web".to_string())]);
    assert!(state.ledger.get(&container_id).is_none());

    fleet_worker::commands::delete(&state, "web".to_string()).await;
    assert_eq!(runtime.calls(), vec![RecordedCommand::Destroy("web".to_string())]);
}

/// S6 - heartbeat refresh: a worker reporting high CPU usage loses
/// placement to one that still looks idle.
#[tokio::test]
async fn s6_heartbeat_refresh_changes_placement_outcome() {
    let (state, _addr) = start_coordinator().await;
    let idle = sample(10.0, 10.0, 10.0, 0, 50);
    let _w1 = register_raw_worker(&state, "w1", idle).await;
    let _w2 = register_raw_worker(&state, "w2", idle).await;

    state.registry.touch(&NodeId::new("w1"), sample(90.0, 10.0, 10.0, 0, 50), Instant::now()).expect("touch");

    let spec = ContainerSpec::new("web").expect("spec");
    let container_id = coord::deploy(&state, spec).await.expect("deploy");

    let record = state.ledger.get(&container_id).expect("record");
    assert_eq!(record.node_id, NodeId::new("w2"));
}
