//! Pure encode/decode of the fixed 8 KiB frame layout. No I/O here.

use crate::error::TransportError;

/// Matches the original `BUFFER_SIZE`.
pub const FRAME_SIZE: usize = 8192;

const TYPE_OFFSET: usize = 0;
const SENDER_OFFSET: usize = 1;
const SENDER_LEN: usize = 256;
const RECIPIENT_OFFSET: usize = SENDER_OFFSET + SENDER_LEN;
const RECIPIENT_LEN: usize = 256;
const DATA_LEN_OFFSET: usize = RECIPIENT_OFFSET + RECIPIENT_LEN;
const DATA_OFFSET: usize = DATA_LEN_OFFSET + 4;

/// Capacity of the `data` region: `FRAME_SIZE - 517`.
pub const DATA_CAPACITY: usize = FRAME_SIZE - DATA_OFFSET;

/// One raw wire frame: a type byte, two NUL-padded identifier fields, and a
/// length-prefixed data region. Corresponds 1:1 to the original `message_t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub sender_id: String,
    pub recipient_id: String,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(msg_type: u8, sender_id: impl Into<String>, recipient_id: impl Into<String>, data: Vec<u8>) -> Self {
        Self { msg_type, sender_id: sender_id.into(), recipient_id: recipient_id.into(), data }
    }

    /// Encode into a fixed-size frame buffer. Returns
    /// [`TransportError::PayloadTooLarge`] if `data` does not fit in
    /// [`DATA_CAPACITY`], or if an identifier exceeds its 256-byte field.
    pub fn encode(&self) -> Result<[u8; FRAME_SIZE], TransportError> {
        if self.data.len() > DATA_CAPACITY {
            return Err(TransportError::PayloadTooLarge {
                declared: self.data.len() as u32,
                capacity: DATA_CAPACITY as u32,
            });
        }
        if self.sender_id.len() >= SENDER_LEN || self.recipient_id.len() >= RECIPIENT_LEN {
            return Err(TransportError::PayloadTooLarge {
                declared: self.sender_id.len().max(self.recipient_id.len()) as u32,
                capacity: (SENDER_LEN - 1) as u32,
            });
        }

        let mut buf = [0u8; FRAME_SIZE];
        buf[TYPE_OFFSET] = self.msg_type;
        buf[SENDER_OFFSET..SENDER_OFFSET + self.sender_id.len()].copy_from_slice(self.sender_id.as_bytes());
        buf[RECIPIENT_OFFSET..RECIPIENT_OFFSET + self.recipient_id.len()]
            .copy_from_slice(self.recipient_id.as_bytes());
        buf[DATA_LEN_OFFSET..DATA_OFFSET].copy_from_slice(&(self.data.len() as u32).to_be_bytes());
        buf[DATA_OFFSET..DATA_OFFSET + self.data.len()].copy_from_slice(&self.data);
        Ok(buf)
    }

    /// Decode a fixed-size frame buffer back into a [`Frame`].
    pub fn decode(buf: &[u8; FRAME_SIZE]) -> Result<Self, TransportError> {
        let msg_type = buf[TYPE_OFFSET];
        let sender_id = read_nul_padded(&buf[SENDER_OFFSET..SENDER_OFFSET + SENDER_LEN])?;
        let recipient_id = read_nul_padded(&buf[RECIPIENT_OFFSET..RECIPIENT_OFFSET + RECIPIENT_LEN])?;

        let len_bytes = &buf[DATA_LEN_OFFSET..DATA_OFFSET];
        let data_length = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
        if data_length as usize > DATA_CAPACITY {
            return Err(TransportError::PayloadTooLarge {
                declared: data_length,
                capacity: DATA_CAPACITY as u32,
            });
        }
        let data = buf[DATA_OFFSET..DATA_OFFSET + data_length as usize].to_vec();

        Ok(Frame { msg_type, sender_id, recipient_id, data })
    }
}

fn read_nul_padded(field: &[u8]) -> Result<String, TransportError> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end]).map(str::to_owned).map_err(|_| TransportError::InvalidIdentifier)
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
