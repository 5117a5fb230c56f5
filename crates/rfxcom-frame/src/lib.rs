//! Length-prefixed frame reassembly for the RFXCOM transceiver protocol.
//!
//! Every packet on the wire is framed as:
//! - A 1-byte length counting every byte after itself
//! - A 1-byte packet type code
//! - `length - 1` payload bytes
//!
//! The [`FrameReassembler`] turns an arbitrarily fragmented byte stream into
//! complete frames; callers never see partial packets.

pub mod codec;
pub mod error;
pub mod reader;
pub mod reassembler;
#[cfg(feature = "async")]
pub mod tokio_codec;
pub mod writer;

pub use codec::{decode_frame, encode_frame, Frame, FrameConfig, HEADER_SIZE, MAX_PAYLOAD};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use reassembler::FrameReassembler;
#[cfg(feature = "async")]
pub use tokio_codec::RfxFrameCodec;
pub use writer::FrameWriter;
