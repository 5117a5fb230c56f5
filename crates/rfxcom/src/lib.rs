//! Schema-driven codec for the RFXCOM home-automation transceiver protocol.
//!
//! The RFXtrx bridges 433/868 MHz radio devices to a serial line. Every
//! packet is a length-prefixed frame whose payload layout is described by a
//! declarative schema; this crate turns raw device bytes into named field
//! values and back.
//!
//! # Crate Structure
//!
//! - [`frame`]: Length-prefixed frame reassembly
//! - [`schema`]: Schema model, registry and field codec
//! - [`protocol`]: Decode sessions, handler dispatch and frame generation
//! - [`builtin`]: Schemas for common device packets, bundled in the binary

pub mod builtin;

/// Re-export frame types.
pub mod frame {
    pub use rfxcom_frame::*;
}

/// Re-export schema types.
pub mod schema {
    pub use rfxcom_schema::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use rfxcom_protocol::*;
}

pub use rfxcom_protocol::{Generator, ProtocolError, Session};
pub use rfxcom_schema::{FieldMap, FieldValue, Message, SchemaRegistry};
