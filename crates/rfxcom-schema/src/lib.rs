//! Declarative packet schemas and field codec for the RFXCOM transceiver
//! protocol.
//!
//! A schema lists the payload fields of one packet type in wire order:
//! plain bytes, enums (optionally indexed by the packet subtype) and flag
//! bits packed eight to a byte. [`Schema::pack`] and [`Schema::unpack`]
//! translate between named field values and payload bytes; the
//! [`SchemaRegistry`] maps incoming type codes back to schemas.

pub mod config;
pub mod error;
pub mod fields;
pub mod model;
pub mod registry;
pub mod source;
pub mod value;

pub use config::RegistryConfig;
pub use error::{CodecError, Result, SchemaError};
pub use fields::{pack, unpack};
pub use model::{EnumTable, FieldKind, FieldSpec, Schema, SUBTYPE_FIELD};
pub use registry::SchemaRegistry;
pub use source::{SchemaSource, SCHEMA_FILE_SUFFIX};
pub use value::{FieldMap, FieldValue, Message};
