//! `tokio_util::codec` adapter for plugging the framing into `FramedRead` /
//! `FramedWrite` over an async serial or socket stream.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, Frame, FrameConfig};
use crate::error::FrameError;

/// Frame codec for async byte streams.
///
/// A decode error ends a `FramedRead` stream; drive a
/// [`FrameReassembler`](crate::FrameReassembler) directly to skip bad frames
/// and keep reading.
#[derive(Debug, Clone, Default)]
pub struct RfxFrameCodec {
    config: FrameConfig,
}

impl RfxFrameCodec {
    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }
}

impl Decoder for RfxFrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_frame(src, self.config.max_payload_size)
    }
}

impl Encoder<Frame> for RfxFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: item.payload.len(),
                max: self.config.max_payload_size,
            });
        }
        encode_frame(item.type_code, &item.payload, dst)
    }
}
