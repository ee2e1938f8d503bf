//! Async boundary: exactly one `read_exact`/`write_all` per logical frame.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::TransportError;
use crate::frame::{Frame, FRAME_SIZE};

/// Read exactly one fixed-size frame. A short read (including a clean EOF
/// mid-frame) is [`TransportError::Truncated`] — fatal to the connection,
/// per the wire contract.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Frame, TransportError> {
    let mut buf = [0u8; FRAME_SIZE];
    match reader.read_exact(&mut buf).await {
        Ok(_) => Frame::decode(&buf),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(TransportError::Truncated),
        Err(e) => Err(TransportError::Io(e)),
    }
}

/// Write exactly one fixed-size frame.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &Frame) -> Result<(), TransportError> {
    let buf = frame.encode()?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "io_tests.rs"]
mod tests;
