//! Wire protocol between the relay and its clients.
//!
//! Every TCP connection carries two kinds of units:
//!
//! - **frames**: an unsigned 16-bit big-endian byte length followed by that
//!   many bytes of UTF-8 text,
//! - **signals**: a single byte, `0` for false and anything else for true.
//!
//! The exchange is: welcome frame (server), name candidate frames (client)
//! each answered by one signal (server), then chat frames in both directions.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Sent by a client to ask the relay to end its session.
pub const LOGOUT_COMMAND: &str = "!salir";

/// Sent by the relay to end the active exchange on both sides.
pub const TERMINATE_SESSION: &str = "!TERMINAR_SESION";

/// Longest text a single frame can carry, in bytes.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Read one framed string.
///
/// EOF before the frame is complete surfaces as `UnexpectedEof`; a body that
/// is not valid UTF-8 surfaces as `InvalidData`.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u16().await? as usize;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    String::from_utf8(body).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Write one framed string and flush it.
///
/// The header and body go out in a single write so a frame is never split
/// between two writers' output.
pub async fn write_frame<W>(writer: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = text.as_bytes();
    if bytes.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "frame of {} bytes exceeds the {} byte limit",
                bytes.len(),
                MAX_FRAME_LEN
            ),
        ));
    }

    let mut encoded = Vec::with_capacity(2 + bytes.len());
    encoded.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    encoded.extend_from_slice(bytes);
    writer.write_all(&encoded).await?;
    writer.flush().await
}

/// Read one boolean signal.
pub async fn read_signal<R>(reader: &mut R) -> io::Result<bool>
where
    R: AsyncRead + Unpin,
{
    Ok(reader.read_u8().await? != 0)
}

/// Write one boolean signal and flush it.
pub async fn write_signal<W>(writer: &mut W, value: bool) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u8(u8::from(value)).await?;
    writer.flush().await
}
