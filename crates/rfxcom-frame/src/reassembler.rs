use bytes::BytesMut;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 512;

/// Accumulates bytes from a stream and cuts them into complete frames.
///
/// Bytes past the last complete frame are kept for the next call, so a frame
/// may arrive split across any number of deliveries. One reassembler belongs
/// to exactly one byte stream.
#[derive(Debug)]
pub struct FrameReassembler {
    buf: BytesMut,
    config: FrameConfig,
}

impl FrameReassembler {
    /// Create a reassembler with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a reassembler with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Append `chunk` and extract at most one complete frame.
    ///
    /// Returns `Ok(None)` while the buffered frame is incomplete. Call again
    /// with an empty chunk to drain further frames that are already buffered.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<Frame>> {
        self.buf.extend_from_slice(chunk);
        let frame = decode_frame(&mut self.buf, self.config.max_payload_size)?;
        if let Some(frame) = &frame {
            tracing::trace!(
                type_code = frame.type_code,
                payload_len = frame.payload.len(),
                buffered = self.buf.len(),
                "frame reassembled"
            );
        }
        Ok(frame)
    }

    /// Append `chunk` and extract every complete frame, in arrival order.
    ///
    /// Malformed frames show up as `Err` entries; frames after them are
    /// still returned.
    pub fn feed_all(&mut self, chunk: &[u8]) -> Vec<Result<Frame>> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        loop {
            match self.feed(&[]) {
                Ok(Some(frame)) => frames.push(Ok(frame)),
                Ok(None) => break,
                Err(err) => frames.push(Err(err)),
            }
        }
        frames
    }

    /// Number of bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// True when no partial frame is pending.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop any buffered partial frame.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Current reassembler configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}
