use super::*;

#[test]
fn new_rejects_empty_name() {
    assert_eq!(ContainerSpec::new("").unwrap_err(), SpecError::EmptyName);
}

#[test]
fn new_rejects_oversized_name() {
    let long = "a".repeat(MAX_NAME_LEN + 1);
    assert_eq!(ContainerSpec::new(long).unwrap_err(), SpecError::NameTooLong);
}

#[test]
fn new_accepts_name_at_the_boundary() {
    let name = "a".repeat(MAX_NAME_LEN);
    assert!(ContainerSpec::new(name).is_ok());
}

#[test]
fn defaults_are_unlimited_and_unprivileged() {
    let spec = ContainerSpec::new("web").unwrap();
    assert_eq!(spec.cpu_limit, 0);
    assert_eq!(spec.memory_limit, 0);
    assert!(!spec.privileged);
    assert!(spec.image.is_none());
}
