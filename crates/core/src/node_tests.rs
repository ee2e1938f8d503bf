use super::*;

#[test]
fn connected_and_busy_are_live() {
    assert!(NodeState::Connected.is_live());
    assert!(NodeState::Busy.is_live());
}

#[test]
fn connecting_disconnected_and_error_are_not_live() {
    assert!(!NodeState::Connecting.is_live());
    assert!(!NodeState::Disconnected.is_live());
    assert!(!NodeState::Error.is_live());
}

#[test]
fn display_matches_wire_spelling() {
    assert_eq!(NodeState::Connected.to_string(), "CONNECTED");
    assert_eq!(NodeState::Disconnected.to_string(), "DISCONNECTED");
}
