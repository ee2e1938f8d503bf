use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed or short read: frame truncated")]
    Truncated,

    #[error("declared data_length {declared} exceeds payload capacity {capacity}")]
    PayloadTooLarge { declared: u32, capacity: u32 },

    #[error("malformed payload for message type {0:?}: {1}")]
    MalformedPayload(MessageTypeDebug, String),

    #[error("identifier field is not valid UTF-8")]
    InvalidIdentifier,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Local copy of the discriminant so `error.rs` doesn't need to depend on
/// `message.rs`'s full enum just to print it.
pub type MessageTypeDebug = u8;
