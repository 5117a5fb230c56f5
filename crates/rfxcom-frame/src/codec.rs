use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: length (1) + type code (1) = 2 bytes.
pub const HEADER_SIZE: usize = 2;

/// Largest payload a one-byte length prefix can describe (the type code
/// takes one of the 255 counted bytes).
pub const MAX_PAYLOAD: usize = u8::MAX as usize - 1;

/// One complete packet: type code plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Packet type code (second byte on the wire).
    pub type_code: u8,
    /// Payload bytes following the type code.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(type_code: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            type_code,
            payload: payload.into(),
        }
    }

    /// Value of the length prefix for this frame.
    pub fn declared_len(&self) -> usize {
        self.payload.len() + 1
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬──────────────────────┐
/// │ Length (1B)  │ Type (1B) │ Payload              │
/// │ = 1 + N      │           │ (N bytes, N <= 254)  │
/// └──────────────┴───────────┴──────────────────────┘
/// ```
pub fn encode_frame(type_code: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8((payload.len() + 1) as u8);
    dst.put_u8(type_code);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. Malformed frames
/// are consumed too, so the next call starts at the following frame.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    let Some(&declared) = src.first() else {
        return Ok(None); // Need more data
    };

    if declared == 0 {
        src.advance(1);
        return Err(FrameError::EmptyFrame);
    }

    let total = 1 + declared as usize;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let mut raw = src.split_to(total);
    raw.advance(1);
    let type_code = raw.get_u8();
    let payload = raw.freeze();

    if payload.len() > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: max_payload,
        });
    }

    Ok(Some(Frame { type_code, payload }))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: [`MAX_PAYLOAD`].
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
        }
    }
}
