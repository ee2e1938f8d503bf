//! `decode(encode(m)) == m` for generated messages, per the bijection
//! invariant in the spec's testable properties.

use proptest::prelude::*;

use crate::message::{Message, MessageType};
use fleet_core::{ContainerSpec, ResourceSample};

fn arb_resource_sample() -> impl Strategy<Value = ResourceSample> {
    (0.0..100.0f64, 0.0..100.0f64, 0.0..100.0f64, 0u32..1024, 0u32..1024).prop_map(
        |(cpu_used, mem_used, disk_used, container_count, max_containers)| ResourceSample {
            cpu_used,
            mem_used,
            disk_used,
            container_count,
            max_containers,
        },
    )
}

fn arb_spec() -> impl Strategy<Value = ContainerSpec> {
    (
        "[a-z][a-z0-9_-]{0,30}",
        proptest::option::of("[a-z0-9:./_-]{1,30}"),
        0u32..64,
        0u32..65536,
        any::<bool>(),
        proptest::collection::vec(("[A-Z_]{1,10}", "[a-zA-Z0-9_/]{0,20}"), 0..5),
        proptest::collection::vec("[a-zA-Z0-9:/_-]{1,20}", 0..5),
        proptest::option::of("[a-z0-9_-]{1,20}"),
    )
        .prop_map(|(name, image, cpu_limit, memory_limit, privileged, env, mounts, network)| ContainerSpec {
            name,
            image,
            cpu_limit,
            memory_limit,
            privileged,
            env,
            mounts,
            network,
        })
}

proptest! {
    #[test]
    fn heartbeat_roundtrips_for_any_sample(sample in arb_resource_sample()) {
        let message = Message::NodeHeartbeat(sample);
        let frame = message.clone().into_frame("w1", "coordinator").unwrap();
        prop_assert_eq!(frame.msg_type, 1);
        let decoded = Message::from_frame(&frame).unwrap();
        prop_assert_eq!(message, decoded);
    }

    #[test]
    fn deploy_container_roundtrips_for_any_spec(spec in arb_spec()) {
        let message = Message::DeployContainer(spec);
        let frame = message.clone().into_frame("w1", "coordinator").unwrap();
        let decoded = Message::from_frame(&frame).unwrap();
        prop_assert_eq!(message, decoded);
    }

    #[test]
    fn register_node_roundtrips_for_any_host(hostname in "[a-z0-9.-]{1,20}", ip in "[0-9.]{7,15}", port in 1u16..65535) {
        let message = Message::RegisterNode { hostname, ip, port };
        let frame = message.clone().into_frame("w1", "coordinator").unwrap();
        let decoded = Message::from_frame(&frame).unwrap();
        prop_assert_eq!(message, decoded);
    }
}

#[test]
fn message_type_unknown_preserves_its_byte() {
    assert_eq!(MessageType::from_discriminant(200), MessageType::Unknown(200));
}
