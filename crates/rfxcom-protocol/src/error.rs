/// Errors that can occur while decoding, dispatching or encoding packets.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] rfxcom_frame::FrameError),

    /// Schema loading error.
    #[error("schema error: {0}")]
    Schema(#[from] rfxcom_schema::SchemaError),

    /// Payload could not be packed or unpacked.
    #[error("codec error: {0}")]
    Codec(#[from] rfxcom_schema::CodecError),

    /// No schema is registered under the requested name.
    #[error("unknown schema {0}")]
    UnknownSchema(String),

    /// No registered schema matches the incoming frame.
    #[error("no schema for type 0x{type_code:02x} ({payload_len} payload bytes)")]
    AmbiguousType { type_code: u8, payload_len: usize },
}

impl ProtocolError {
    /// True when the error concerns a single incoming frame and the stream
    /// can continue with the next one.
    pub fn is_frame_local(&self) -> bool {
        match self {
            Self::Frame(err) => err.is_frame_local(),
            Self::Codec(_) | Self::AmbiguousType { .. } => true,
            Self::Schema(_) | Self::UnknownSchema(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
