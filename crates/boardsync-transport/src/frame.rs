//! Length-prefixed framing for raw byte streams.
//!
//! A TCP stream has no message boundaries: one `read` may return half a
//! message, or two messages glued together. Every message is therefore
//! written as:
//!
//! ```text
//! ┌──────────────────┬─────────────────────────┐
//! │ len: u32 (BE)    │ payload: len bytes      │
//! └──────────────────┴─────────────────────────┘
//! ```
//!
//! Frames larger than [`MAX_FRAME_LEN`] are refused on both sides.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 4;

/// Largest payload accepted in a single frame (1 MiB).
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Writes `payload` as one frame and flushes the writer.
///
/// # Errors
/// `InvalidInput` if the payload exceeds [`MAX_FRAME_LEN`], or any I/O
/// error from the underlying writer.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "frame of {} bytes exceeds limit of {MAX_FRAME_LEN}",
                payload.len()
            ),
        ));
    }

    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

/// Reads the next frame from `reader`.
///
/// Returns `Ok(None)` if the stream ends cleanly on a frame boundary.
///
/// # Errors
/// - `UnexpectedEof` if the stream ends inside a header or payload.
/// - `InvalidData` if the announced length exceeds [`MAX_FRAME_LEN`].
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended inside frame header",
            ));
        }
        filled += n;
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("announced frame of {len} bytes exceeds limit of {MAX_FRAME_LEN}"),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_frame_back_to_back_frames_stay_separate() {
        // Two writes that land in one read buffer must still come out
        // as two messages.
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, b"first").await.unwrap();
        write_frame(&mut client, b"second").await.unwrap();

        assert_eq!(read_frame(&mut server).await.unwrap().unwrap(), b"first");
        assert_eq!(read_frame(&mut server).await.unwrap().unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_read_frame_empty_payload() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, b"").await.unwrap();

        let frame = read_frame(&mut server).await.unwrap().unwrap();
        assert!(frame.is_empty());
    }

    #[tokio::test]
    async fn test_read_frame_clean_eof_returns_none() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);

        assert!(read_frame(&mut server).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_eof_inside_header_is_error() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&[0, 0]).await.unwrap();
        drop(client);

        let err = read_frame(&mut server).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_read_frame_truncated_payload_is_error() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&10u32.to_be_bytes()).await.unwrap();
        client.write_all(b"abc").await.unwrap();
        drop(client);

        let err = read_frame(&mut server).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_read_frame_oversized_length_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let len = (MAX_FRAME_LEN as u32) + 1;
        client.write_all(&len.to_be_bytes()).await.unwrap();

        let err = read_frame(&mut server).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_write_frame_oversized_payload_is_rejected() {
        let (mut client, _server) = tokio::io::duplex(64);
        let payload = vec![0u8; MAX_FRAME_LEN + 1];

        let err = write_frame(&mut client, &payload).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_write_frame_prefixes_big_endian_length() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, b"hi").await.unwrap();
        drop(client);

        let mut raw = Vec::new();
        server.read_to_end(&mut raw).await.unwrap();
        assert_eq!(raw, vec![0, 0, 0, 2, b'h', b'i']);
    }
}
