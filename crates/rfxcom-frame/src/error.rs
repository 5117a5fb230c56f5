/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A zero length prefix: the frame carries no type code.
    #[error("empty frame (zero length prefix)")]
    EmptyFrame,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream reached end of file.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// True when the error only concerns the current frame and the byte
    /// stream can keep being read.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::EmptyFrame | Self::PayloadTooLarge { .. })
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
