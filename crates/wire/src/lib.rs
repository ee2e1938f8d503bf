//! fleet-wire: the fixed-size framed envelope carried over every worker ↔
//! coordinator TCP connection.
//!
//! This is a direct typed port of the original `message_t` struct, not a
//! JSON+length-prefix protocol: every frame is exactly [`FRAME_SIZE`] bytes,
//! network byte order, so one `read_exact` is always one logical message.
//! [`frame`] holds the pure encode/decode of that fixed layout; [`message`]
//! interprets the frame's `data` region per message type; [`io`] is the only
//! place that touches an actual socket.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod frame;
mod io;
mod message;

pub use error::TransportError;
pub use frame::{Frame, FRAME_SIZE};
pub use io::{read_frame, write_frame};
pub use message::{ContainerStatusPayload, Message, MessageType};

#[cfg(test)]
mod property_tests;
