use super::*;

#[test]
fn roundtrips_a_small_payload() {
    let frame = Frame::new(0, "w1", "coordinator", b"hello".to_vec());
    let encoded = frame.encode().unwrap();
    let decoded = Frame::decode(&encoded).unwrap();
    assert_eq!(frame, decoded);
}

#[test]
fn roundtrips_empty_identifiers_and_data() {
    let frame = Frame::new(9, "", "", Vec::new());
    let encoded = frame.encode().unwrap();
    let decoded = Frame::decode(&encoded).unwrap();
    assert_eq!(frame, decoded);
}

#[test]
fn roundtrips_data_at_full_capacity() {
    let frame = Frame::new(2, "w1", "coordinator", vec![0xAB; DATA_CAPACITY]);
    let encoded = frame.encode().unwrap();
    let decoded = Frame::decode(&encoded).unwrap();
    assert_eq!(frame.data.len(), DATA_CAPACITY);
    assert_eq!(frame, decoded);
}

#[test]
fn rejects_data_over_capacity() {
    let frame = Frame::new(2, "w1", "coordinator", vec![0; DATA_CAPACITY + 1]);
    assert!(matches!(frame.encode(), Err(TransportError::PayloadTooLarge { .. })));
}

#[test]
fn rejects_identifier_at_full_field_width() {
    let frame = Frame::new(0, "a".repeat(256), "coordinator", Vec::new());
    assert!(matches!(frame.encode(), Err(TransportError::PayloadTooLarge { .. })));
}

#[test]
fn decode_rejects_corrupted_data_length() {
    let mut buf = [0u8; FRAME_SIZE];
    // Claim a data_length larger than the data region can hold.
    buf[513..517].copy_from_slice(&(DATA_CAPACITY as u32 + 1).to_be_bytes());
    assert!(matches!(Frame::decode(&buf), Err(TransportError::PayloadTooLarge { .. })));
}

#[test]
fn frame_size_matches_original_buffer_size() {
    assert_eq!(FRAME_SIZE, 8192);
}
