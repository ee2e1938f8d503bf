use super::*;
use fleet_core::ContainerSpec;
use std::sync::Arc;
use std::time::Duration;

struct FakeConn;

fn registry_with(nodes: &[(&str, fleet_core::NodeState, f64, f64, f64, u32, u32)]) -> NodeRegistry<FakeConn> {
    let reg = NodeRegistry::new();
    let conn = Arc::new(FakeConn);
    let now = Instant::now();
    for (id, state, cpu, mem, disk, count, max) in nodes {
        reg.register(NodeId::new(*id), "h".into(), "1.2.3.4".into(), 9000, &conn, now).unwrap();
        let sample = fleet_core::ResourceSample {
            cpu_used: *cpu,
            mem_used: *mem,
            disk_used: *disk,
            container_count: *count,
            max_containers: *max,
        };
        reg.touch(&NodeId::new(*id), sample, now).unwrap();
        for _ in 0..*count {
            reg.attach_container(&NodeId::new(*id), ContainerId::new(&NodeId::new(*id), "filler")).unwrap();
        }
        if *state != fleet_core::NodeState::Connected {
            match state {
                fleet_core::NodeState::Disconnected => reg.mark_disconnected(&NodeId::new(*id)).unwrap(),
                fleet_core::NodeState::Error => reg.mark_error(&NodeId::new(*id)).unwrap(),
                _ => {}
            }
        }
    }
    reg
}

fn spec() -> ContainerSpec {
    ContainerSpec::new("web").unwrap()
}

use fleet_core::ContainerId;
use fleet_core::NodeState;

#[test]
fn picks_the_worker_with_more_free_resources() {
    let reg = registry_with(&[
        ("w1", NodeState::Connected, 80.0, 80.0, 80.0, 0, 50),
        ("w2", NodeState::Connected, 10.0, 10.0, 10.0, 0, 50),
    ]);
    let chosen = pick_node(&reg, &spec(), Instant::now()).unwrap();
    assert_eq!(chosen, NodeId::new("w2"));
}

#[test]
fn ties_break_on_lexicographically_smaller_id() {
    let reg = registry_with(&[
        ("w2", NodeState::Connected, 10.0, 10.0, 10.0, 0, 50),
        ("w1", NodeState::Connected, 10.0, 10.0, 10.0, 0, 50),
    ]);
    let chosen = pick_node(&reg, &spec(), Instant::now()).unwrap();
    assert_eq!(chosen, NodeId::new("w1"));
}

#[test]
fn saturated_worker_is_excluded() {
    let reg = registry_with(&[("w1", NodeState::Connected, 10.0, 10.0, 10.0, 2, 2)]);
    let err = pick_node(&reg, &spec(), Instant::now()).unwrap_err();
    assert_eq!(err, Error::NoCapacity);
}

#[test]
fn disconnected_worker_is_excluded() {
    let reg = registry_with(&[("w1", NodeState::Disconnected, 10.0, 10.0, 10.0, 0, 50)]);
    let err = pick_node(&reg, &spec(), Instant::now()).unwrap_err();
    assert_eq!(err, Error::NoCapacity);
}

#[test]
fn stale_heartbeat_is_excluded() {
    let reg = registry_with(&[("w1", NodeState::Connected, 10.0, 10.0, 10.0, 0, 50)]);
    let far_future = Instant::now() + Duration::from_secs(31);
    let err = pick_node(&reg, &spec(), far_future).unwrap_err();
    assert_eq!(err, Error::NoCapacity);
}

#[test]
fn heartbeat_refresh_changes_placement_outcome() {
    let reg = registry_with(&[
        ("w1", NodeState::Connected, 10.0, 10.0, 10.0, 0, 50),
        ("w2", NodeState::Connected, 10.0, 10.0, 10.0, 0, 50),
    ]);
    let now = Instant::now();
    reg.touch(
        &NodeId::new("w1"),
        fleet_core::ResourceSample { cpu_used: 90.0, mem_used: 10.0, disk_used: 10.0, container_count: 0, max_containers: 50 },
        now,
    )
    .unwrap();
    let chosen = pick_node(&reg, &spec(), now).unwrap();
    assert_eq!(chosen, NodeId::new("w2"));
}

#[test]
fn empty_registry_has_no_capacity() {
    let reg: NodeRegistry<FakeConn> = NodeRegistry::new();
    assert_eq!(pick_node(&reg, &spec(), Instant::now()).unwrap_err(), Error::NoCapacity);
}
