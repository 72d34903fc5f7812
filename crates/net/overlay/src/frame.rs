//! Join handshake frames.
//!
//! ```text
//! JOIN: 0x01 | port: u16 (BE)
//! ACK:  0x02 | peers: u32 (BE)
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const JOIN_TAG: u8 = 0x01;
const ACK_TAG: u8 = 0x02;

/// Largest encoded frame.
pub(crate) const MAX_FRAME_LEN: usize = 5;

/// Errors from decoding a datagram frame.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,

    #[error("unknown frame tag {0:#04x}")]
    UnknownTag(u8),

    #[error("frame length {actual} does not match expected {expected}")]
    Length { expected: usize, actual: usize },
}

/// A join handshake frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Request to join, carrying the joiner's listening port.
    Join { port: u16 },
    /// Join accepted, carrying the responder's known peer count.
    Ack { peers: u32 },
}

impl Frame {
    fn payload_len(tag: u8) -> Result<usize, FrameError> {
        match tag {
            JOIN_TAG => Ok(2),
            ACK_TAG => Ok(4),
            other => Err(FrameError::UnknownTag(other)),
        }
    }

    /// Encode the frame into a fresh buffer.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(MAX_FRAME_LEN);
        match *self {
            Frame::Join { port } => {
                buf.put_u8(JOIN_TAG);
                buf.put_u16(port);
            }
            Frame::Ack { peers } => {
                buf.put_u8(ACK_TAG);
                buf.put_u32(peers);
            }
        }
        buf.freeze()
    }

    /// Decode a complete frame, as received in a single datagram.
    pub fn decode(mut buf: &[u8]) -> Result<Self, FrameError> {
        if !buf.has_remaining() {
            return Err(FrameError::Empty);
        }
        let tag = buf.get_u8();
        let expected = Self::payload_len(tag)?;
        if buf.remaining() != expected {
            return Err(FrameError::Length {
                expected: expected + 1,
                actual: buf.remaining() + 1,
            });
        }

        Ok(match tag {
            JOIN_TAG => Frame::Join {
                port: buf.get_u16(),
            },
            _ => Frame::Ack {
                peers: buf.get_u32(),
            },
        })
    }

    /// Read one frame from a byte stream.
    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<Self> {
        let tag = reader.read_u8().await?;
        match tag {
            JOIN_TAG => Ok(Frame::Join {
                port: reader.read_u16().await?,
            }),
            ACK_TAG => Ok(Frame::Ack {
                peers: reader.read_u32().await?,
            }),
            other => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                FrameError::UnknownTag(other),
            )),
        }
    }

    /// Write the frame to a byte stream and flush it.
    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.encode()).await?;
        writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_wire_layout() {
        let encoded = Frame::Join { port: 23334 }.encode();
        assert_eq!(encoded.as_ref(), &[0x01, 0x5B, 0x26]);
        assert_eq!(Frame::decode(&encoded), Ok(Frame::Join { port: 23334 }));
    }

    #[test]
    fn test_ack_wire_layout() {
        let encoded = Frame::Ack { peers: 3 }.encode();
        assert_eq!(encoded.as_ref(), &[0x02, 0, 0, 0, 3]);
        assert_eq!(encoded.len(), MAX_FRAME_LEN);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(Frame::decode(&[]), Err(FrameError::Empty));
        assert_eq!(Frame::decode(&[0x7f, 0, 0]), Err(FrameError::UnknownTag(0x7f)));
        assert_eq!(
            Frame::decode(&[0x01, 0]),
            Err(FrameError::Length {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            Frame::decode(&[0x02, 0, 0, 0, 1, 9]),
            Err(FrameError::Length {
                expected: 5,
                actual: 6
            })
        );
    }

    #[tokio::test]
    async fn test_stream_read_back_to_back() {
        let mut wire = Vec::new();
        Frame::Join { port: 1 }.write_to(&mut wire).await.unwrap();
        Frame::Ack { peers: 7 }.write_to(&mut wire).await.unwrap();

        let mut reader = wire.as_slice();
        assert_eq!(
            Frame::read_from(&mut reader).await.unwrap(),
            Frame::Join { port: 1 }
        );
        assert_eq!(
            Frame::read_from(&mut reader).await.unwrap(),
            Frame::Ack { peers: 7 }
        );
    }

    #[tokio::test]
    async fn test_stream_unknown_tag_is_invalid_data() {
        let mut reader: &[u8] = &[0x09];
        let err = Frame::read_from(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
