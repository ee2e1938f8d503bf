use super::*;

#[test]
fn has_capacity_when_below_max() {
    let sample = ResourceSample { container_count: 1, max_containers: 2, ..ResourceSample::ZERO };
    assert!(sample.has_capacity());
}

#[test]
fn no_capacity_when_at_max() {
    let sample = ResourceSample { container_count: 2, max_containers: 2, ..ResourceSample::ZERO };
    assert!(!sample.has_capacity());
}

#[test]
fn zero_max_never_has_capacity() {
    assert!(!ResourceSample::ZERO.has_capacity());
}
