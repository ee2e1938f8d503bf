use super::*;

#[test]
fn container_id_joins_node_and_name() {
    let node = NodeId::new("host1_412");
    let id = ContainerId::new(&node, "web");
    assert_eq!(id.as_str(), "host1_412_web");
}

#[test]
fn node_id_borrows_as_str_for_map_lookup() {
    use std::collections::HashMap;
    let mut map: HashMap<NodeId, u32> = HashMap::new();
    map.insert(NodeId::new("w1"), 1);
    assert_eq!(map.get("w1"), Some(&1));
}

#[test]
fn node_id_display_matches_inner_string() {
    let id = NodeId::new("worker-7");
    assert_eq!(id.to_string(), "worker-7");
}

#[test]
fn node_id_ord_is_lexicographic() {
    let mut ids = vec![NodeId::new("w2"), NodeId::new("w10"), NodeId::new("w1")];
    ids.sort();
    assert_eq!(ids, vec![NodeId::new("w1"), NodeId::new("w10"), NodeId::new("w2")]);
}
