// Frame codec: [4-byte big-endian length N][N bytes UTF-8 JSON].
//
// The reader always consumes exactly the declared number of bytes; a
// short read (the peer closing mid-frame) is terminal for the
// connection, surfaced as `ProtocolError::ConnectionClosed` rather than
// a generic io error so callers can tell "hung up" apart from "broken
// pipe while we were still mid-handshake".

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;

/// Frames larger than this are rejected before any body bytes are read,
/// so a corrupt length prefix can't force an unbounded allocation.
pub const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// Reads one length-prefixed JSON frame and decodes it as `T`.
pub async fn read_frame<T, R>(reader: &mut R) -> Result<T, ProtocolError>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let bytes = read_frame_bytes(reader).await?;
    let value = serde_json::from_slice(&bytes)?;
    Ok(value)
}

/// Reads one length-prefixed frame and returns its raw body bytes.
pub async fn read_frame_bytes<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }

    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge(len, MAX_FRAME_BYTES));
    }

    let mut body = vec![0u8; len as usize];
    match reader.read_exact(&mut body).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }

    Ok(body)
}

/// Serializes `value` to JSON and writes it as one length-prefixed frame.
pub async fn write_frame<T, W>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(value)?;
    let len: u32 = body
        .len()
        .try_into()
        .map_err(|_| ProtocolError::FrameTooLarge(u32::MAX, MAX_FRAME_BYTES))?;

    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}
