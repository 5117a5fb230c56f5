//! Inbound decode, dispatch and outbound encode for the RFXCOM transceiver
//! protocol.
//!
//! This is the "just works" layer. A [`Session`] consumes raw bytes from
//! the device, resolves each frame to a schema, decodes it and routes the
//! result to a handler registered by schema name. A [`Generator`] builds
//! outgoing frames from named field values.

pub mod dispatch;
pub mod error;
pub mod generator;
pub mod session;

pub use dispatch::{Dispatched, Dispatcher, FallbackHandler, Handler};
pub use error::{ProtocolError, Result};
pub use generator::Generator;
pub use session::Session;

pub use rfxcom_frame::Frame;
pub use rfxcom_schema::{FieldMap, FieldValue, Message, Schema, SchemaRegistry};
